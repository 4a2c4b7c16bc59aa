use url::Url;

pub struct DomainParser;
impl DomainParser {
    pub fn get_domain(url: &Url) -> Option<addr::domain::Name<'_>> {
        url.domain().and_then(|x| addr::parse_domain_name(x).ok())
    }

    /// Get the root domain (the registrable part)
    pub fn get_domain_root(url: &Url) -> Option<&str> {
        Self::get_domain(url).and_then(|x| x.root())
    }

    pub fn is_root_one_of(url: &Url, roots: &[&str]) -> bool {
        Self::get_domain_root(url).is_some_and(|root| {
            roots
                .iter()
                .any(|x| root.eq_ignore_ascii_case(x))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).expect("valid url")
    }

    #[test]
    fn root_ignores_subdomains() {
        assert_eq!(
            DomainParser::get_domain_root(&url("https://open.spotify.com/track/abc")),
            Some("spotify.com")
        );
        assert_eq!(
            DomainParser::get_domain_root(&url("https://m.youtube.com/watch?v=1")),
            Some("youtube.com")
        );
        assert_eq!(
            DomainParser::get_domain_root(&url("https://youtu.be/abc")),
            Some("youtu.be")
        );
    }

    #[test]
    fn ip_hosts_have_no_root() {
        assert_eq!(DomainParser::get_domain_root(&url("http://127.0.0.1/x")), None);
        assert!(!DomainParser::is_root_one_of(
            &url("http://127.0.0.1/x"),
            &["youtube.com"]
        ));
    }

    #[test]
    fn lookalike_domains_do_not_match() {
        assert!(DomainParser::is_root_one_of(
            &url("https://vm.tiktok.com/ZM123/"),
            &["tiktok.com"]
        ));
        assert!(!DomainParser::is_root_one_of(
            &url("https://tiktok.com.evil.example/x"),
            &["tiktok.com"]
        ));
    }
}
