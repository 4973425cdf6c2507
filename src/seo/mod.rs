//! Structured data (JSON-LD) for search engines

use serde::Serialize;

/// Publisher named on every article record
pub const PUBLISHER_NAME: &str = "Folio";

const SCHEMA_CONTEXT: &str = "https://schema.org";

/// JSON-LD `Article`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub headline: String,
    pub description: String,
    #[serde(rename = "datePublished")]
    pub date_published: String,
    pub author: Person,
    pub publisher: Organization,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organization {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: &'static str,
}

/// Build the article record for one post. Total: no input is rejected.
pub fn build_article_record(
    headline: &str,
    description: &str,
    date_published: &str,
    author_name: &str,
) -> ArticleRecord {
    ArticleRecord {
        context: SCHEMA_CONTEXT,
        kind: "Article",
        headline: headline.to_string(),
        description: description.to_string(),
        date_published: date_published.to_string(),
        author: Person {
            kind: "Person",
            name: author_name.to_string(),
        },
        publisher: Organization {
            kind: "Organization",
            name: PUBLISHER_NAME,
        },
    }
}

impl ArticleRecord {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "@context": self.context,
            "@type": self.kind,
            "headline": self.headline,
            "description": self.description,
            "datePublished": self.date_published,
            "author": { "@type": self.author.kind, "name": self.author.name },
            "publisher": { "@type": self.publisher.kind, "name": self.publisher.name },
        })
    }

    /// `<script type="application/ld+json">` element for a page head
    pub fn to_script_tag(&self) -> String {
        // `</` inside a string would close the script element early
        let json = self.to_json().to_string().replace("</", "<\\/");
        format!(r#"<script type="application/ld+json">{}</script>"#, json)
    }
}
