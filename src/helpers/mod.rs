pub mod domain;
pub mod download;
pub mod sanitize;
pub mod tagger;
