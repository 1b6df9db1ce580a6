//! Synthetic campus lost-and-found data.
//!
//! Everything here is driven by a single [`StdRng`], so a fixed seed yields the
//! same users and items on every run.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::fmt;

pub const CATEGORIES: [&str; 7] = [
    "electronics",
    "documents",
    "books",
    "umbrellas",
    "keys",
    "clothing",
    "other",
];

const FIRST_NAMES: [&str; 16] = [
    "alex", "bo", "chen", "dana", "eli", "fang", "grace", "hao", "ivy", "jun", "kai", "lin",
    "mei", "noah", "ping", "yu",
];

const LAST_NAMES: [&str; 12] = [
    "wang", "li", "zhang", "liu", "chen", "yang", "zhao", "huang", "zhou", "wu", "xu", "sun",
];

const EMAIL_DOMAINS: [&str; 4] = ["campus.edu", "mail.campus.edu", "example.com", "example.org"];

const LOCATIONS: [&str; 10] = [
    "Main Library",
    "Student Center",
    "North Cafeteria",
    "Gymnasium",
    "Science Building",
    "Lecture Hall A",
    "Dormitory 3",
    "Bus Stop, East Gate",
    "Sports Field",
    "Computer Lab 2",
];

const COLORS: [&str; 8] = [
    "black", "white", "blue", "red", "grey", "green", "silver", "brown",
];

fn nouns_for(category: &str) -> &'static [&'static str] {
    match category {
        "electronics" => &["phone", "laptop charger", "earbuds", "calculator", "power bank"],
        "documents" => &["student card", "passport", "library card", "ID card"],
        "books" => &["textbook", "notebook", "novel", "lab manual"],
        "umbrellas" => &["umbrella", "folding umbrella"],
        "keys" => &["key ring", "dorm key", "bike key", "car key"],
        "clothing" => &["jacket", "scarf", "cap", "hoodie", "glove"],
        _ => &["water bottle", "backpack", "wallet", "pencil case"],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    Lost,
    Found,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Lost => "lost",
            ItemType::Found => "found",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub category: &'static str,
    pub item_type: ItemType,
    pub status: &'static str,
    pub location: String,
    pub item_date: NaiveDateTime,
    /// Index into the generated user list; mapped to a row id on insert.
    pub owner: usize,
}

pub struct DataGenerator {
    rng: StdRng,
    now: DateTime<Utc>,
}

impl DataGenerator {
    pub fn new(seed: Option<u64>, now: DateTime<Utc>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, now }
    }

    pub fn users(&mut self, count: usize) -> Vec<NewUser> {
        let mut taken = HashSet::with_capacity(count);
        let mut users = Vec::with_capacity(count);

        while users.len() < count {
            let first = self.pick(&FIRST_NAMES);
            let last = self.pick(&LAST_NAMES);
            let number: u16 = self.rng.gen_range(1..1000);

            let base = format!("{first}_{last}{number}");
            let mut username = base.clone();
            let mut suffix = 1;
            while !taken.insert(username.clone()) {
                suffix += 1;
                username = format!("{base}_{suffix}");
            }

            let domain = self.pick(&EMAIL_DOMAINS);
            users.push(NewUser {
                email: format!("{username}@{domain}"),
                username,
            });
        }

        users
    }

    pub fn items(&mut self, count: usize, user_count: usize) -> Vec<NewItem> {
        if user_count == 0 {
            return Vec::new();
        }

        (0..count).map(|_| self.item(user_count)).collect()
    }

    fn item(&mut self, user_count: usize) -> NewItem {
        let category = self.pick(&CATEGORIES);
        let noun = self.pick(nouns_for(category));
        let color = self.pick(&COLORS);
        let location = self.pick(&LOCATIONS);
        let item_type = if self.rng.gen_bool(0.5) {
            ItemType::Lost
        } else {
            ItemType::Found
        };

        let seconds_ago = self.rng.gen_range(0..365 * 24 * 60 * 60);
        let item_date = (self.now - Duration::seconds(seconds_ago)).naive_utc();

        let description = match item_type {
            ItemType::Lost => format!(
                "Lost a {color} {noun} somewhere around the {}. Please get in touch if you have seen it.",
                location.to_lowercase()
            ),
            ItemType::Found => format!(
                "Found a {color} {noun} near the {}. Message me with a description to claim it.",
                location.to_lowercase()
            ),
        };

        NewItem {
            name: capitalize(&format!("{color} {noun}")),
            description,
            category,
            item_type,
            status: "open",
            location: location.to_string(),
            item_date,
            owner: self.rng.gen_range(0..user_count),
        }
    }

    fn pick<T: Copy>(&mut self, options: &[T]) -> T {
        options[self.rng.gen_range(0..options.len())]
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_same_seed_same_rows() {
        let mut a = DataGenerator::new(Some(42), fixed_now());
        let mut b = DataGenerator::new(Some(42), fixed_now());

        assert_eq!(a.users(10), b.users(10));
        assert_eq!(a.items(50, 10), b.items(50, 10));
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = DataGenerator::new(Some(1), fixed_now());
        let mut b = DataGenerator::new(Some(2), fixed_now());

        assert_ne!(a.items(20, 5), b.items(20, 5));
    }

    #[test]
    fn test_usernames_and_emails_are_unique() {
        let mut generator = DataGenerator::new(Some(7), fixed_now());
        let users = generator.users(500);

        let usernames: HashSet<_> = users.iter().map(|u| &u.username).collect();
        let emails: HashSet<_> = users.iter().map(|u| &u.email).collect();
        assert_eq!(usernames.len(), 500);
        assert_eq!(emails.len(), 500);
        assert!(users.iter().all(|u| u.email.contains('@')));
    }

    #[test]
    fn test_items_stay_in_domain() {
        let now = fixed_now();
        let mut generator = DataGenerator::new(Some(3), now);
        let items = generator.items(200, 4);

        assert_eq!(items.len(), 200);
        for item in &items {
            assert!(CATEGORIES.contains(&item.category));
            assert_eq!(item.status, "open");
            assert!(item.owner < 4);
            assert!(item.item_date <= now.naive_utc());
            assert!(item.item_date >= (now - Duration::days(365)).naive_utc());
            assert!(item.name.chars().next().unwrap().is_uppercase());
        }

        assert!(items.iter().any(|i| i.item_type == ItemType::Lost));
        assert!(items.iter().any(|i| i.item_type == ItemType::Found));
    }

    #[test]
    fn test_no_items_without_users() {
        let mut generator = DataGenerator::new(Some(3), fixed_now());
        assert!(generator.items(10, 0).is_empty());
    }
}
