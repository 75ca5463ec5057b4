use crate::db::Statement;

use super::dimension::{Classification, Rank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Article,
    Link,
    DigitalMedia,
    Share,
    Language,
    Lda,
    Polarity,
}

impl EntityKind {
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Article => "article",
            EntityKind::Link => "link",
            EntityKind::DigitalMedia => "digital_media",
            EntityKind::Share => "share",
            EntityKind::Language => "language",
            EntityKind::Lda => "lda",
            EntityKind::Polarity => "polarity",
        }
    }

    /// The entity whose generated id this one references.
    pub fn parent(self) -> Option<EntityKind> {
        match self {
            EntityKind::Article => None,
            EntityKind::Link
            | EntityKind::DigitalMedia
            | EntityKind::Share
            | EntityKind::Language => Some(EntityKind::Article),
            EntityKind::Lda | EntityKind::Polarity => Some(EntityKind::Language),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArticleRecord {
    pub category_id: i64,
    pub day_id: i64,
    pub num_keywords: f64,
    pub n_tokens_title: f64,
    pub n_tokens_content: f64,
    pub average_token_length: f64,
    pub n_non_stop_words: f64,
    pub n_unique_tokens: f64,
    pub n_non_stop_unique_tokens: f64,
    pub shares: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkRecord {
    pub num_hrefs: f64,
    pub num_self_hrefs: f64,
    pub self_reference_min_shares: f64,
    pub self_reference_avg_shares: f64,
    pub self_reference_max_shares: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DigitalMediaRecord {
    pub num_imgs: f64,
    pub num_videos: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShareRecord {
    pub rank: Rank,
    pub classification: Classification,
    pub n_shares: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LanguageRecord {
    pub title_subjectivity: f64,
    pub global_subjectivity: f64,
    pub abs_title_subjectivity: f64,
    pub title_sentiment_polarity: f64,
    pub global_rate_positive_words: f64,
    pub global_rate_negative_words: f64,
    pub rate_positive_words: f64,
    pub rate_negative_words: f64,
    pub global_sentiment_polarity: f64,
    pub abs_title_sentiment_polarity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LdaRecord {
    pub topic_index: u8,
    pub ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarityRecord {
    pub classification: Classification,
    pub ratio: f64,
    pub is_positive: bool,
}

/// One insert for one fact row, in the order it has to be issued.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityWrite {
    Article(ArticleRecord),
    Link(LinkRecord),
    DigitalMedia(DigitalMediaRecord),
    Share(ShareRecord),
    Language(LanguageRecord),
    Lda(LdaRecord),
    Polarity(PolarityRecord),
}

impl EntityWrite {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityWrite::Article(_) => EntityKind::Article,
            EntityWrite::Link(_) => EntityKind::Link,
            EntityWrite::DigitalMedia(_) => EntityKind::DigitalMedia,
            EntityWrite::Share(_) => EntityKind::Share,
            EntityWrite::Language(_) => EntityKind::Language,
            EntityWrite::Lda(_) => EntityKind::Lda,
            EntityWrite::Polarity(_) => EntityKind::Polarity,
        }
    }

    /// Short description used in logs and failure reports.
    pub fn intent(&self) -> String {
        let table = self.kind().table();
        match self {
            EntityWrite::Share(s) => format!(
                "insert {table} ({}/{})",
                s.rank.label(),
                s.classification.label()
            ),
            EntityWrite::Lda(l) => format!("insert {table} (topic {})", l.topic_index),
            EntityWrite::Polarity(p) => format!(
                "insert {table} ({} {})",
                if p.is_positive { "positive" } else { "negative" },
                p.classification.label()
            ),
            _ => format!("insert {table}"),
        }
    }

    /// Builds the insert. `parent_id` is the article or language id the
    /// entity references and is ignored for articles.
    pub fn statement(&self, parent_id: i64) -> Statement {
        let table = self.kind().table();
        match self {
            EntityWrite::Article(a) => Statement::insert(
                table,
                &[
                    "category_id",
                    "day_id",
                    "num_keywords",
                    "n_tokens_title",
                    "n_tokens_content",
                    "average_token_length",
                    "n_non_stop_words",
                    "n_unique_tokens",
                    "n_non_stop_unique_tokens",
                    "shares",
                ],
            )
            .bind(a.category_id)
            .bind(a.day_id)
            .bind(a.num_keywords)
            .bind(a.n_tokens_title)
            .bind(a.n_tokens_content)
            .bind(a.average_token_length)
            .bind(a.n_non_stop_words)
            .bind(a.n_unique_tokens)
            .bind(a.n_non_stop_unique_tokens)
            .bind(a.shares),
            EntityWrite::Link(l) => Statement::insert(
                table,
                &[
                    "article_id",
                    "num_hrefs",
                    "num_self_hrefs",
                    "self_reference_min_shares",
                    "self_reference_avg_shares",
                    "self_reference_max_shares",
                ],
            )
            .bind(parent_id)
            .bind(l.num_hrefs)
            .bind(l.num_self_hrefs)
            .bind(l.self_reference_min_shares)
            .bind(l.self_reference_avg_shares)
            .bind(l.self_reference_max_shares),
            EntityWrite::DigitalMedia(d) => {
                Statement::insert(table, &["article_id", "num_imgs", "num_videos"])
                    .bind(parent_id)
                    .bind(d.num_imgs)
                    .bind(d.num_videos)
            }
            EntityWrite::Share(s) => Statement::insert(
                table,
                &["article_id", "rank", "classification", "n_shares"],
            )
            .bind(parent_id)
            .bind(s.rank.label())
            .bind(s.classification.label())
            .bind(s.n_shares),
            EntityWrite::Language(l) => Statement::insert(
                table,
                &[
                    "article_id",
                    "title_subjectivity",
                    "global_subjectivity",
                    "abs_title_subjectivity",
                    "title_sentiment_polarity",
                    "global_rate_positive_words",
                    "global_rate_negative_words",
                    "rate_positive_words",
                    "rate_negative_words",
                    "global_sentiment_polarity",
                    "abs_title_sentiment_polarity",
                ],
            )
            .bind(parent_id)
            .bind(l.title_subjectivity)
            .bind(l.global_subjectivity)
            .bind(l.abs_title_subjectivity)
            .bind(l.title_sentiment_polarity)
            .bind(l.global_rate_positive_words)
            .bind(l.global_rate_negative_words)
            .bind(l.rate_positive_words)
            .bind(l.rate_negative_words)
            .bind(l.global_sentiment_polarity)
            .bind(l.abs_title_sentiment_polarity),
            EntityWrite::Lda(l) => Statement::insert(table, &["language_id", "n_topic", "ratio"])
                .bind(parent_id)
                .bind(i64::from(l.topic_index))
                .bind(l.ratio),
            EntityWrite::Polarity(p) => Statement::insert(
                table,
                &["language_id", "classification", "ratio", "is_positive"],
            )
            .bind(parent_id)
            .bind(p.classification.label())
            .bind(p.ratio)
            .bind(p.is_positive),
        }
    }
}
