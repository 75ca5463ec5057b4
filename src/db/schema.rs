pub const SCHEMA: &str = r#"
-- dimension tables
CREATE TABLE IF NOT EXISTS day (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    is_weekend INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS category (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS rank (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    description TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS classification (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    description TEXT NOT NULL UNIQUE
);

-- article table (category_id/day_id are 0 when the one-hot group was empty)
CREATE TABLE IF NOT EXISTS article (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category_id INTEGER NOT NULL REFERENCES category(id),
    day_id INTEGER NOT NULL REFERENCES day(id),
    num_keywords REAL NOT NULL,
    n_tokens_title REAL NOT NULL,
    n_tokens_content REAL NOT NULL,
    average_token_length REAL NOT NULL,
    n_non_stop_words REAL NOT NULL,
    n_unique_tokens REAL NOT NULL,
    n_non_stop_unique_tokens REAL NOT NULL,
    shares INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_article_category_id ON article(category_id);
CREATE INDEX IF NOT EXISTS idx_article_day_id ON article(day_id);

-- article children
CREATE TABLE IF NOT EXISTS link (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    article_id INTEGER NOT NULL UNIQUE REFERENCES article(id),
    num_hrefs REAL NOT NULL,
    num_self_hrefs REAL NOT NULL,
    self_reference_min_shares REAL NOT NULL,
    self_reference_avg_shares REAL NOT NULL,
    self_reference_max_shares REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS digital_media (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    article_id INTEGER NOT NULL UNIQUE REFERENCES article(id),
    num_imgs REAL NOT NULL,
    num_videos REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS share (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    article_id INTEGER NOT NULL REFERENCES article(id),
    rank TEXT NOT NULL,
    classification TEXT NOT NULL,
    n_shares REAL NOT NULL,
    UNIQUE(article_id, rank, classification)
);

CREATE INDEX IF NOT EXISTS idx_share_article_id ON share(article_id);

CREATE TABLE IF NOT EXISTS language (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    article_id INTEGER NOT NULL UNIQUE REFERENCES article(id),
    title_subjectivity REAL NOT NULL,
    global_subjectivity REAL NOT NULL,
    abs_title_subjectivity REAL NOT NULL,
    title_sentiment_polarity REAL NOT NULL,
    global_rate_positive_words REAL NOT NULL,
    global_rate_negative_words REAL NOT NULL,
    rate_positive_words REAL NOT NULL,
    rate_negative_words REAL NOT NULL,
    global_sentiment_polarity REAL NOT NULL,
    abs_title_sentiment_polarity REAL NOT NULL
);

-- language children
CREATE TABLE IF NOT EXISTS lda (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    language_id INTEGER NOT NULL REFERENCES language(id),
    n_topic INTEGER NOT NULL,
    ratio REAL NOT NULL,
    UNIQUE(language_id, n_topic)
);

CREATE INDEX IF NOT EXISTS idx_lda_language_id ON lda(language_id);

CREATE TABLE IF NOT EXISTS polarity (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    language_id INTEGER NOT NULL REFERENCES language(id),
    classification TEXT NOT NULL,
    ratio REAL NOT NULL,
    is_positive INTEGER NOT NULL,
    UNIQUE(language_id, classification, is_positive)
);

CREATE INDEX IF NOT EXISTS idx_polarity_language_id ON polarity(language_id);
"#;

/// Tables in foreign-key order, parents first.
pub const TABLES: [&str; 11] = [
    "day",
    "category",
    "rank",
    "classification",
    "article",
    "link",
    "digital_media",
    "share",
    "language",
    "lda",
    "polarity",
];
