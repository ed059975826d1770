//! HTML templates for generated pages

use maud::{html, DOCTYPE};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters that cannot appear raw in a link target.
const HREF_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?');

/// One row of a directory listing.
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
}

impl ListingEntry {
    fn label(&self) -> String {
        if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }

    fn href(&self) -> String {
        let encoded = utf8_percent_encode(&self.name, HREF_ESCAPE);
        if self.is_dir {
            format!("{encoded}/")
        } else {
            encoded.to_string()
        }
    }
}

pub fn directory_listing_html(dir: &str, entries: &[ListingEntry]) -> String {
    let h = html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "Directory listing for " (dir) }
            }
            body {
                h1 { "Directory listing for " (dir) }
                hr;
                ul {
                    @for entry in entries {
                        li { a href=(entry.href()) { (entry.label()) } }
                    }
                }
                hr;
            }
        }
    };
    h.into_string()
}

pub fn unsupported_method_html(method: &str) -> String {
    let h = html! {
        (DOCTYPE)
        meta charset="utf-8";
        title { "501 Not Implemented" }
        h1 { "Not Implemented" }
        p { "Unsupported method (" (method) ")." }
    };
    h.into_string()
}
