use std::collections::HashMap;

use chrono::Weekday;
use csv::StringRecord;
use tracing::debug;

use crate::db::Store;
use crate::error::{Result, RowFormatError, SchemaError};
use crate::models::{
    day_name, ArticleRecord, Category, Classification, Dimension, DigitalMediaRecord,
    EntityWrite, LanguageRecord, LdaRecord, LinkRecord, PolarityRecord, Rank, ShareRecord,
};

use super::columns::{
    field_offset, CATEGORY_GROUP, DAY_GROUP, FIELD_COUNT, LDA_COLUMNS, POLARITY_COLUMNS,
    SHARE_COLUMNS,
};
use super::lookup::{LookupCache, UNRESOLVED_ID};

/// Single-valued fields read by name.
const SCALAR_FIELDS: [&str; 25] = [
    "n_tokens_title",
    "n_tokens_content",
    "n_unique_tokens",
    "n_non_stop_words",
    "n_non_stop_unique_tokens",
    "num_hrefs",
    "num_self_hrefs",
    "num_imgs",
    "num_videos",
    "average_token_length",
    "num_keywords",
    "self_reference_min_shares",
    "self_reference_max_shares",
    "self_reference_avg_shares",
    "global_subjectivity",
    "global_sentiment_polarity",
    "global_rate_positive_words",
    "global_rate_negative_words",
    "rate_positive_words",
    "rate_negative_words",
    "title_subjectivity",
    "title_sentiment_polarity",
    "abs_title_subjectivity",
    "abs_title_sentiment_polarity",
    "shares",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Column {
    name: &'static str,
    offset: usize,
}

impl Column {
    fn resolve(name: &'static str) -> std::result::Result<Self, SchemaError> {
        Ok(Self {
            name,
            offset: field_offset(name)?,
        })
    }

    fn raw<'r>(&self, row: &'r StringRecord) -> std::result::Result<&'r str, RowFormatError> {
        row.get(self.offset)
            .map(str::trim)
            .ok_or(RowFormatError::FieldCount {
                expected: FIELD_COUNT,
                found: row.len(),
            })
    }

    fn invalid(&self, expected: &'static str, value: &str) -> RowFormatError {
        RowFormatError::InvalidValue {
            field: self.name,
            offset: self.offset,
            expected,
            value: value.to_string(),
        }
    }

    fn real(&self, row: &StringRecord) -> std::result::Result<f64, RowFormatError> {
        let raw = self.raw(row)?;
        finite(raw).ok_or_else(|| self.invalid("decimal", raw))
    }

    fn integer(&self, row: &StringRecord) -> std::result::Result<i64, RowFormatError> {
        let raw = self.raw(row)?;
        raw.parse().map_err(|_| self.invalid("integer", raw))
    }

    fn flag(&self, row: &StringRecord) -> std::result::Result<bool, RowFormatError> {
        let raw = self.raw(row)?;
        let value = finite(raw).ok_or_else(|| self.invalid("one-hot flag", raw))?;
        Ok(value == 1.0)
    }
}

/// `NaN` and the infinities parse as `f64` but cannot be stored.
fn finite(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Every record derived from one input row.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedRow {
    pub article: ArticleRecord,
    pub link: LinkRecord,
    pub digital_media: DigitalMediaRecord,
    pub shares: Vec<ShareRecord>,
    pub language: LanguageRecord,
    pub lda: Vec<LdaRecord>,
    pub polarity: Vec<PolarityRecord>,
}

impl ExpandedRow {
    /// Inserts in foreign-key order: the article and its children, then the
    /// language record and its children.
    pub fn writes(&self) -> Vec<EntityWrite> {
        let mut writes =
            Vec::with_capacity(4 + self.shares.len() + self.lda.len() + self.polarity.len());
        writes.push(EntityWrite::Article(self.article));
        writes.push(EntityWrite::Link(self.link));
        writes.push(EntityWrite::DigitalMedia(self.digital_media));
        writes.extend(self.shares.iter().copied().map(EntityWrite::Share));
        writes.push(EntityWrite::Language(self.language));
        writes.extend(self.lda.iter().copied().map(EntityWrite::Lda));
        writes.extend(self.polarity.iter().copied().map(EntityWrite::Polarity));
        writes
    }
}

/// Turns a raw CSV row into article, link, media, share, language, LDA and
/// polarity records.
pub struct RecordExpander {
    scalars: HashMap<&'static str, Column>,
    categories: Vec<(Category, Column)>,
    days: Vec<(Weekday, Column)>,
    shares: Vec<(Rank, Classification, Column)>,
    lda: Vec<(u8, Column)>,
    polarity: Vec<(Classification, bool, Column)>,
}

impl RecordExpander {
    /// Resolves every column the expander reads, so an inconsistent layout
    /// fails here rather than on the first row.
    pub fn new() -> std::result::Result<Self, SchemaError> {
        let scalars = SCALAR_FIELDS
            .iter()
            .map(|name| Column::resolve(*name).map(|c| (*name, c)))
            .collect::<std::result::Result<HashMap<_, _>, _>>()?;
        let categories = CATEGORY_GROUP
            .iter()
            .map(|(c, name)| Column::resolve(*name).map(|col| (*c, col)))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let days = DAY_GROUP
            .iter()
            .map(|(d, name)| Column::resolve(*name).map(|col| (*d, col)))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let shares = SHARE_COLUMNS
            .iter()
            .map(|(r, c, name)| Column::resolve(*name).map(|col| (*r, *c, col)))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let lda = LDA_COLUMNS
            .iter()
            .map(|(topic, name)| Column::resolve(*name).map(|col| (*topic, col)))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let polarity = POLARITY_COLUMNS
            .iter()
            .map(|(c, positive, name)| Column::resolve(*name).map(|col| (*c, *positive, col)))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            scalars,
            categories,
            days,
            shares,
            lda,
            polarity,
        })
    }

    pub async fn expand<S: Store + ?Sized>(
        &self,
        row: &StringRecord,
        cache: &mut LookupCache,
        store: &S,
    ) -> Result<ExpandedRow> {
        if row.len() != FIELD_COUNT {
            return Err(RowFormatError::FieldCount {
                expected: FIELD_COUNT,
                found: row.len(),
            }
            .into());
        }

        // Parse everything before touching storage.
        let category = first_set(row, &self.categories)?;
        let day = first_set(row, &self.days)?;

        let article = ArticleRecord {
            category_id: UNRESOLVED_ID,
            day_id: UNRESOLVED_ID,
            num_keywords: self.real(row, "num_keywords")?,
            n_tokens_title: self.real(row, "n_tokens_title")?,
            n_tokens_content: self.real(row, "n_tokens_content")?,
            average_token_length: self.real(row, "average_token_length")?,
            n_non_stop_words: self.real(row, "n_non_stop_words")?,
            n_unique_tokens: self.real(row, "n_unique_tokens")?,
            n_non_stop_unique_tokens: self.real(row, "n_non_stop_unique_tokens")?,
            shares: self.column("shares")?.integer(row)?,
        };

        let link = LinkRecord {
            num_hrefs: self.real(row, "num_hrefs")?,
            num_self_hrefs: self.real(row, "num_self_hrefs")?,
            self_reference_min_shares: self.real(row, "self_reference_min_shares")?,
            self_reference_avg_shares: self.real(row, "self_reference_avg_shares")?,
            self_reference_max_shares: self.real(row, "self_reference_max_shares")?,
        };

        let digital_media = DigitalMediaRecord {
            num_imgs: self.real(row, "num_imgs")?,
            num_videos: self.real(row, "num_videos")?,
        };

        let shares = self
            .shares
            .iter()
            .map(|(rank, classification, column)| {
                column.real(row).map(|n_shares| ShareRecord {
                    rank: *rank,
                    classification: *classification,
                    n_shares,
                })
            })
            .collect::<std::result::Result<Vec<_>, RowFormatError>>()?;

        let language = LanguageRecord {
            title_subjectivity: self.real(row, "title_subjectivity")?,
            global_subjectivity: self.real(row, "global_subjectivity")?,
            abs_title_subjectivity: self.real(row, "abs_title_subjectivity")?,
            title_sentiment_polarity: self.real(row, "title_sentiment_polarity")?,
            global_rate_positive_words: self.real(row, "global_rate_positive_words")?,
            global_rate_negative_words: self.real(row, "global_rate_negative_words")?,
            rate_positive_words: self.real(row, "rate_positive_words")?,
            rate_negative_words: self.real(row, "rate_negative_words")?,
            global_sentiment_polarity: self.real(row, "global_sentiment_polarity")?,
            abs_title_sentiment_polarity: self.real(row, "abs_title_sentiment_polarity")?,
        };

        let lda = self
            .lda
            .iter()
            .map(|(topic_index, column)| {
                column.real(row).map(|ratio| LdaRecord {
                    topic_index: *topic_index,
                    ratio,
                })
            })
            .collect::<std::result::Result<Vec<_>, RowFormatError>>()?;

        let polarity = self
            .polarity
            .iter()
            .map(|(classification, is_positive, column)| {
                column.real(row).map(|ratio| PolarityRecord {
                    classification: *classification,
                    ratio,
                    is_positive: *is_positive,
                })
            })
            .collect::<std::result::Result<Vec<_>, RowFormatError>>()?;

        let category_id = match category {
            Some(c) => cache.resolve(store, Dimension::Category, c.name()).await?,
            None => {
                debug!("no category flag set");
                UNRESOLVED_ID
            }
        };
        let day_id = match day {
            Some(d) => cache.resolve(store, Dimension::Day, day_name(d)).await?,
            None => {
                debug!("no weekday flag set");
                UNRESOLVED_ID
            }
        };

        Ok(ExpandedRow {
            article: ArticleRecord {
                category_id,
                day_id,
                ..article
            },
            link,
            digital_media,
            shares,
            language,
            lda,
            polarity,
        })
    }

    fn column(&self, name: &'static str) -> std::result::Result<Column, SchemaError> {
        self.scalars
            .get(name)
            .copied()
            .ok_or_else(|| SchemaError::UnknownField(name.to_string()))
    }

    fn real(&self, row: &StringRecord, name: &'static str) -> Result<f64> {
        Ok(self.column(name)?.real(row)?)
    }
}

/// First flag set in a one-hot group, in declaration order.
fn first_set<T: Copy + std::fmt::Debug>(
    row: &StringRecord,
    group: &[(T, Column)],
) -> std::result::Result<Option<T>, RowFormatError> {
    let mut set = Vec::new();
    for (value, column) in group {
        if column.flag(row)? {
            set.push(*value);
        }
    }
    if set.len() > 1 {
        debug!(flags = ?set, "several one-hot flags set, using the first");
    }
    Ok(set.first().copied())
}
