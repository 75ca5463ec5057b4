//! Fixed column layout of the Online News Popularity CSV.
//!
//! Every offset the loader reads comes from [`COLUMNS`]; nothing else in the
//! crate indexes a row with a literal.

use chrono::Weekday;

use crate::error::SchemaError;
use crate::models::{Category, Classification, Rank};

pub const FIELD_COUNT: usize = 61;

/// Semantic field names by zero-based column offset.
pub const COLUMNS: [&str; FIELD_COUNT] = [
    "url",
    "timedelta",
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
    // category one-hot group
    "data_channel_is_lifestyle",
    "data_channel_is_entertainment",
    "data_channel_is_bus",
    "data_channel_is_socmed",
    "data_channel_is_tech",
    "data_channel_is_world",
    // share metrics, worst/best/average x min/max/avg
    "kw_min_min",
    "kw_max_min",
    "kw_avg_min",
    "kw_min_max",
    "kw_max_max",
    "kw_avg_max",
    "kw_min_avg",
    "kw_max_avg",
    "kw_avg_avg",
    "self_reference_min_shares",
    "self_reference_max_shares",
    "self_reference_avg_shares",
    // day one-hot group
    "weekday_is_monday",
    "weekday_is_tuesday",
    "weekday_is_wednesday",
    "weekday_is_thursday",
    "weekday_is_friday",
    "weekday_is_saturday",
    "weekday_is_sunday",
    "is_weekend",
    "lda_00",
    "lda_01",
    "lda_02",
    "lda_03",
    "lda_04",
    "global_subjectivity",
    "global_sentiment_polarity",
    "global_rate_positive_words",
    "global_rate_negative_words",
    "rate_positive_words",
    "rate_negative_words",
    "avg_positive_polarity",
    "min_positive_polarity",
    "max_positive_polarity",
    "avg_negative_polarity",
    "min_negative_polarity",
    "max_negative_polarity",
    "title_subjectivity",
    "title_sentiment_polarity",
    "abs_title_subjectivity",
    "abs_title_sentiment_polarity",
    "shares",
];

/// Category one-hot columns in declaration order; the first set flag wins.
pub const CATEGORY_GROUP: [(Category, &str); 6] = [
    (Category::Lifestyle, "data_channel_is_lifestyle"),
    (Category::Entertainment, "data_channel_is_entertainment"),
    (Category::Business, "data_channel_is_bus"),
    (Category::SocialMedia, "data_channel_is_socmed"),
    (Category::Technology, "data_channel_is_tech"),
    (Category::World, "data_channel_is_world"),
];

/// Day one-hot columns, Monday first; the first set flag wins.
pub const DAY_GROUP: [(Weekday, &str); 7] = [
    (Weekday::Mon, "weekday_is_monday"),
    (Weekday::Tue, "weekday_is_tuesday"),
    (Weekday::Wed, "weekday_is_wednesday"),
    (Weekday::Thu, "weekday_is_thursday"),
    (Weekday::Fri, "weekday_is_friday"),
    (Weekday::Sat, "weekday_is_saturday"),
    (Weekday::Sun, "weekday_is_sunday"),
];

pub const SHARE_COLUMNS: [(Rank, Classification, &str); 9] = [
    (Rank::Worst, Classification::Minimum, "kw_min_min"),
    (Rank::Worst, Classification::Maximum, "kw_max_min"),
    (Rank::Worst, Classification::Average, "kw_avg_min"),
    (Rank::Best, Classification::Minimum, "kw_min_max"),
    (Rank::Best, Classification::Maximum, "kw_max_max"),
    (Rank::Best, Classification::Average, "kw_avg_max"),
    (Rank::Average, Classification::Minimum, "kw_min_avg"),
    (Rank::Average, Classification::Maximum, "kw_max_avg"),
    (Rank::Average, Classification::Average, "kw_avg_avg"),
];

pub const LDA_COLUMNS: [(u8, &str); 5] = [
    (0, "lda_00"),
    (1, "lda_01"),
    (2, "lda_02"),
    (3, "lda_03"),
    (4, "lda_04"),
];

/// `(classification, is_positive, column)`.
pub const POLARITY_COLUMNS: [(Classification, bool, &str); 6] = [
    (Classification::Average, true, "avg_positive_polarity"),
    (Classification::Minimum, true, "min_positive_polarity"),
    (Classification::Maximum, true, "max_positive_polarity"),
    (Classification::Average, false, "avg_negative_polarity"),
    (Classification::Minimum, false, "min_negative_polarity"),
    (Classification::Maximum, false, "max_negative_polarity"),
];

/// Offset of a named field.
pub fn field_offset(name: &str) -> Result<usize, SchemaError> {
    COLUMNS
        .iter()
        .position(|column| *column == name)
        .ok_or_else(|| SchemaError::UnknownField(name.to_string()))
}

/// Fails fast when the input header does not have the expected width.
pub fn check_header(found: usize) -> Result<(), SchemaError> {
    if found == FIELD_COUNT {
        Ok(())
    } else {
        Err(SchemaError::ColumnCount {
            expected: FIELD_COUNT,
            found,
        })
    }
}
