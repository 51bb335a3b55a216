use serde::{Deserialize, Serialize};

/// Fallback shown when a book has no title
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Fallback shown when a book has no authors
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Fallback shown for grid cards without a title
pub const NO_TITLE: &str = "No Title";

/// Fallback for any missing free-text detail field
pub const NO_DESCRIPTION: &str = "No description available.";

/// A single catalog entry.
///
/// The upstream catalog does not guarantee any field, including the identifier.
/// Entries without an id are still displayed but can't be opened in the detail view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub volume_info: Option<VolumeInfo>,
}

/// Descriptive metadata of a book. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    pub page_count: Option<u32>,
    pub print_type: Option<String>,
    pub categories: Option<Vec<String>>,
    pub average_rating: Option<f32>,
    pub ratings_count: Option<u32>,
    pub image_links: Option<ImageLinks>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageLinks {
    pub small_thumbnail: Option<String>,
    pub thumbnail: Option<String>,
}

/// Ordered result of a search. An empty collection is a successful zero-match search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCollection {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<Book>,

    #[serde(default)]
    pub total_items: Option<u32>,
}

// The catalog sends `"items": null` as well as omitting the key.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Book>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Book>>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl Book {
    /// Create a book carrying only an identifier
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            volume_info: None,
        }
    }

    /// The identifier, if it can be used for a detail lookup
    pub fn selectable_id(&self) -> Option<&str> {
        non_empty(self.id.as_ref())
    }

    fn info(&self) -> Option<&VolumeInfo> {
        self.volume_info.as_ref()
    }

    pub fn title(&self) -> &str {
        self.info()
            .and_then(|i| non_empty(i.title.as_ref()))
            .unwrap_or(UNKNOWN_TITLE)
    }

    /// Title used on grid cards
    pub fn card_title(&self) -> &str {
        self.info()
            .and_then(|i| non_empty(i.title.as_ref()))
            .unwrap_or(NO_TITLE)
    }

    /// Authors joined with ", ", or the unknown-author fallback
    pub fn authors_display(&self) -> String {
        let authors: Vec<&str> = self
            .info()
            .and_then(|i| i.authors.as_ref())
            .map(|a| a.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        if authors.is_empty() {
            UNKNOWN_AUTHOR.to_string()
        } else {
            authors.join(", ")
        }
    }

    pub fn description(&self) -> &str {
        self.text_or_fallback(|i| i.description.as_ref())
    }

    pub fn published_date(&self) -> &str {
        self.text_or_fallback(|i| i.published_date.as_ref())
    }

    pub fn print_type(&self) -> &str {
        self.text_or_fallback(|i| i.print_type.as_ref())
    }

    pub fn language(&self) -> &str {
        self.text_or_fallback(|i| i.language.as_ref())
    }

    pub fn page_count(&self) -> Option<u32> {
        self.info().and_then(|i| i.page_count)
    }

    pub fn average_rating(&self) -> Option<f32> {
        self.info().and_then(|i| i.average_rating)
    }

    /// Best available cover image, upgraded to https.
    ///
    /// The catalog frequently hands out plain `http://` thumbnail links.
    pub fn thumbnail_url(&self) -> Option<String> {
        let links = self.info()?.image_links.as_ref()?;
        let url = non_empty(links.thumbnail.as_ref())
            .or_else(|| non_empty(links.small_thumbnail.as_ref()))?;

        Some(match url.strip_prefix("http://") {
            Some(rest) => format!("https://{}", rest),
            None => url.to_string(),
        })
    }

    fn text_or_fallback<F>(&self, field: F) -> &str
    where
        F: FnOnce(&VolumeInfo) -> Option<&String>,
    {
        self.info()
            .and_then(|i| non_empty(field(i)))
            .unwrap_or(NO_DESCRIPTION)
    }
}

impl BookCollection {
    pub fn new(items: Vec<Book>) -> Self {
        let total_items = Some(items.len() as u32);
        Self { items, total_items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up a result by its 1-based position in the grid
    pub fn get_by_position(&self, position: usize) -> Option<&Book> {
        position.checked_sub(1).and_then(|i| self.items.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_search_response() {
        let json = r#"{
            "kind": "books#volumes",
            "totalItems": 2,
            "items": [
                {
                    "id": "abc123",
                    "volumeInfo": {
                        "title": "Jazz: A History",
                        "authors": ["Ted Gioia"],
                        "pageCount": 452,
                        "imageLinks": { "thumbnail": "http://books.google.com/t.jpg" }
                    }
                },
                { "id": "bare" }
            ]
        }"#;

        let collection: BookCollection = serde_json::from_str(json).unwrap();

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.total_items, Some(2));
        assert_eq!(collection.items[0].title(), "Jazz: A History");
        assert_eq!(collection.items[0].page_count(), Some(452));
        assert_eq!(collection.items[1].title(), UNKNOWN_TITLE);
    }

    #[test]
    fn test_decode_zero_matches() {
        let collection: BookCollection =
            serde_json::from_str(r#"{"kind": "books#volumes", "totalItems": 0}"#).unwrap();
        assert!(collection.is_empty());

        let collection: BookCollection = serde_json::from_str(r#"{"items": null}"#).unwrap();
        assert!(collection.is_empty());
    }

    #[test]
    fn test_book_without_id_is_not_selectable() {
        let book: Book = serde_json::from_str(r#"{"volumeInfo": {"title": "Orphan"}}"#).unwrap();
        assert!(book.selectable_id().is_none());

        let book = Book::with_id("   ");
        assert!(book.selectable_id().is_none());

        let book = Book::with_id("xyz");
        assert_eq!(book.selectable_id(), Some("xyz"));
    }

    #[test]
    fn test_display_fallbacks() {
        let book = Book::with_id("only-id");

        assert_eq!(book.title(), UNKNOWN_TITLE);
        assert_eq!(book.card_title(), NO_TITLE);
        assert_eq!(book.authors_display(), UNKNOWN_AUTHOR);
        assert_eq!(book.description(), NO_DESCRIPTION);
        assert_eq!(book.published_date(), NO_DESCRIPTION);
        assert_eq!(book.print_type(), NO_DESCRIPTION);
        assert_eq!(book.language(), NO_DESCRIPTION);
        assert!(book.thumbnail_url().is_none());
        assert!(book.page_count().is_none());
    }

    #[test]
    fn test_authors_joined() {
        let book = Book {
            id: Some("1".to_string()),
            volume_info: Some(VolumeInfo {
                authors: Some(vec!["A. One".to_string(), "".to_string(), "B. Two".to_string()]),
                ..Default::default()
            }),
        };
        assert_eq!(book.authors_display(), "A. One, B. Two");
    }

    #[test]
    fn test_thumbnail_upgrade_and_fallback() {
        let mut book = Book {
            id: None,
            volume_info: Some(VolumeInfo {
                image_links: Some(ImageLinks {
                    small_thumbnail: Some("http://example.com/small.jpg".to_string()),
                    thumbnail: None,
                }),
                ..Default::default()
            }),
        };
        assert_eq!(
            book.thumbnail_url().as_deref(),
            Some("https://example.com/small.jpg")
        );

        if let Some(info) = book.volume_info.as_mut() {
            info.image_links = Some(ImageLinks {
                small_thumbnail: Some("http://example.com/small.jpg".to_string()),
                thumbnail: Some("https://example.com/large.jpg".to_string()),
            });
        }
        assert_eq!(
            book.thumbnail_url().as_deref(),
            Some("https://example.com/large.jpg")
        );
    }

    #[test]
    fn test_get_by_position_is_one_based() {
        let collection = BookCollection::new(vec![Book::with_id("a"), Book::with_id("b")]);
        assert!(collection.get_by_position(0).is_none());
        assert_eq!(collection.get_by_position(1).unwrap().id.as_deref(), Some("a"));
        assert_eq!(collection.get_by_position(2).unwrap().id.as_deref(), Some("b"));
        assert!(collection.get_by_position(3).is_none());
    }

    fn arb_opt_string() -> impl Strategy<Value = Option<String>> {
        proptest::option::of(".{0,12}")
    }

    prop_compose! {
        fn arb_volume_info()(
            title in arb_opt_string(),
            authors in proptest::option::of(proptest::collection::vec(".{0,8}", 0..3)),
            description in arb_opt_string(),
            published_date in arb_opt_string(),
            language in arb_opt_string(),
            page_count in proptest::option::of(any::<u32>()),
            thumbnail in arb_opt_string(),
        ) -> VolumeInfo {
            VolumeInfo {
                title,
                authors,
                description,
                published_date,
                language,
                page_count,
                image_links: thumbnail.map(|t| ImageLinks { small_thumbnail: None, thumbnail: Some(t) }),
                ..Default::default()
            }
        }
    }

    proptest! {
        #[test]
        fn prop_display_never_empty(
            id in arb_opt_string(),
            info in proptest::option::of(arb_volume_info()),
        ) {
            let book = Book { id, volume_info: info };

            prop_assert!(!book.title().is_empty());
            prop_assert!(!book.card_title().is_empty());
            prop_assert!(!book.authors_display().is_empty());
            prop_assert!(!book.description().is_empty());
            prop_assert!(!book.language().is_empty());
        }
    }
}
