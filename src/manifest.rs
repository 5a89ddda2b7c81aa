//! Gallery manifest rendering.
//!
//! The manifest is an HTML fragment meant to be included into a larger page:
//! one thumbnail block per gallery image, blocks separated by a blank line,
//! no document wrapper. Each block links to the image and displays it, both
//! through the gallery-relative path:
//!
//! ```html
//! <div class="col-lg-3 col-md-4 col-xs-6 thumb"><a class="thumbnail" href="/img/gallery/a.jpg"><img class="img-responsive" src="/img/gallery/a.jpg" alt=""></a></div>
//! ```
//!
//! Rendering is pure so the same listing always yields the same bytes.

use crate::config::RemoteConfig;
use crate::transfer::RemoteEntry;
use maud::{Markup, html};

/// One thumbnail block for an image at `href`.
fn thumbnail(href: &str) -> Markup {
    html! {
        div class="col-lg-3 col-md-4 col-xs-6 thumb" {
            a class="thumbnail" href=(href) {
                img class="img-responsive" src=(href) alt="";
            }
        }
    }
}

/// Render the fragments for `entries`, in the given order.
///
/// Returns an empty string for an empty listing; deciding whether that is
/// publishable is the caller's job.
pub fn render(entries: &[RemoteEntry], remote: &RemoteConfig) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let fragments: Vec<String> = entries
        .iter()
        .map(|entry| thumbnail(&remote.gallery_ref(&entry.file_name)).into_string())
        .collect();
    let mut content = fragments.join("\n\n");
    content.push('\n');
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(names: &[&str]) -> Vec<RemoteEntry> {
        names.iter().map(|n| RemoteEntry::new(*n)).collect()
    }

    #[test]
    fn single_fragment_markup() {
        let html = render(&entries(&["a.jpg"]), &RemoteConfig::default());
        assert_eq!(
            html,
            "<div class=\"col-lg-3 col-md-4 col-xs-6 thumb\">\
             <a class=\"thumbnail\" href=\"/img/gallery/a.jpg\">\
             <img class=\"img-responsive\" src=\"/img/gallery/a.jpg\" alt=\"\">\
             </a></div>\n"
        );
    }

    #[test]
    fn two_entries_two_fragments_each_self_referencing() {
        let html = render(&entries(&["a.jpg", "b.png"]), &RemoteConfig::default());
        let fragments: Vec<&str> = html.trim_end().split("\n\n").collect();

        assert_eq!(fragments.len(), 2);
        assert!(fragments[0].contains("href=\"/img/gallery/a.jpg\""));
        assert!(fragments[0].contains("src=\"/img/gallery/a.jpg\""));
        assert!(!fragments[0].contains("b.png"));
        assert!(fragments[1].contains("href=\"/img/gallery/b.png\""));
        assert!(fragments[1].contains("src=\"/img/gallery/b.png\""));
        assert!(!fragments[1].contains("a.jpg"));
    }

    #[test]
    fn keeps_listing_order() {
        let html = render(&entries(&["z.jpg", "a.jpg"]), &RemoteConfig::default());
        assert!(html.find("z.jpg").unwrap() < html.find("a.jpg").unwrap());
    }

    #[test]
    fn empty_listing_renders_nothing() {
        assert!(render(&[], &RemoteConfig::default()).is_empty());
    }

    #[test]
    fn file_names_are_escaped() {
        let html = render(&entries(&["a\"onload=x.jpg"]), &RemoteConfig::default());
        assert!(html.contains("a&quot;onload=x.jpg"));
        assert!(!html.contains("a\"onload"));
    }

    #[test]
    fn custom_gallery_path_is_used() {
        let remote = RemoteConfig {
            gallery: "photos/".to_string(),
            ..RemoteConfig::default()
        };
        let html = render(&entries(&["c.bmp"]), &remote);
        assert!(html.contains("href=\"photos/c.bmp\""));
    }

    #[test]
    fn rendering_is_deterministic() {
        let listing = entries(&["a.jpg", "b.png", "c.jpeg"]);
        let remote = RemoteConfig::default();
        assert_eq!(render(&listing, &remote), render(&listing, &remote));
    }
}
