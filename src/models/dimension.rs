use chrono::Weekday;

/// Dimensions resolved per row through the lookup cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Day,
    Category,
}

impl Dimension {
    pub fn table(self) -> &'static str {
        match self {
            Dimension::Day => "day",
            Dimension::Category => "category",
        }
    }

    pub fn lookup_sql(self) -> &'static str {
        match self {
            Dimension::Day => "SELECT id, name FROM day",
            Dimension::Category => "SELECT id, name FROM category",
        }
    }
}

pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Name stored in `day.name`.
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Lifestyle,
    Entertainment,
    Business,
    SocialMedia,
    Technology,
    World,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Lifestyle,
        Category::Entertainment,
        Category::Business,
        Category::SocialMedia,
        Category::Technology,
        Category::World,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Lifestyle => "Lifestyle",
            Category::Entertainment => "Entertainment",
            Category::Business => "Business",
            Category::SocialMedia => "Social Media",
            Category::Technology => "Technology",
            Category::World => "World",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rank {
    Best,
    Worst,
    Average,
}

impl Rank {
    pub const ALL: [Rank; 3] = [Rank::Best, Rank::Worst, Rank::Average];

    pub fn label(self) -> &'static str {
        match self {
            Rank::Best => "best",
            Rank::Worst => "worst",
            Rank::Average => "average",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Minimum,
    Average,
    Maximum,
}

impl Classification {
    pub const ALL: [Classification; 3] = [
        Classification::Minimum,
        Classification::Average,
        Classification::Maximum,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Classification::Minimum => "minimum",
            Classification::Average => "average",
            Classification::Maximum => "maximum",
        }
    }
}
