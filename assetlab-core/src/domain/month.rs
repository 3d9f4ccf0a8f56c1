//! Calendar month: the categorical month label and its numeric index.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar month, ordered January through December.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

/// Which set of twelve abbreviations a month column is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthLocale {
    /// `ene feb mar abr may jun jul ago sep oct nov dic`
    #[default]
    Spanish,
    /// `jan feb mar apr may jun jul aug sep oct nov dec`
    English,
}

const SPANISH: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
];

const ENGLISH: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

impl MonthLocale {
    /// The twelve recognized labels, January first.
    pub fn labels(self) -> &'static [&'static str; 12] {
        match self {
            MonthLocale::Spanish => &SPANISH,
            MonthLocale::English => &ENGLISH,
        }
    }
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// Look up an abbreviation in the locale's twelve-label domain.
    ///
    /// Case-insensitive, surrounding whitespace ignored. Returns `None` for
    /// anything outside the domain; callers turn that into a category error.
    pub fn parse(label: &str, locale: MonthLocale) -> Option<Month> {
        let label = label.trim();
        locale
            .labels()
            .iter()
            .position(|l| l.eq_ignore_ascii_case(label))
            .map(|i| Month::ALL[i])
    }

    /// 1 for January through 12 for December.
    pub fn index(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_index(index: u8) -> Option<Month> {
        match index {
            1..=12 => Some(Month::ALL[(index - 1) as usize]),
            _ => None,
        }
    }

    pub fn from_date(date: NaiveDate) -> Month {
        Month::ALL[date.month0() as usize]
    }

    pub fn label(self, locale: MonthLocale) -> &'static str {
        locale.labels()[self as usize]
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label(MonthLocale::English))
    }
}
