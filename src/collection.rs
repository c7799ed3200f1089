//! The closed set of synchronized collections.
//!
//! Each collection knows its remote table name (snake_case), its local cache
//! key (camelCase, matching the local record convention), and which fields
//! exist on only one side of the sync boundary. Keeping the field sets as
//! `const` tables here means the transcoder's stripping rules are checked
//! where they are defined instead of by convention at each call site.

use std::fmt;

use serde::Serialize;

/// Remote-only bookkeeping fields, present on every collection.
const REMOTE_BOOKKEEPING: &[&str] = &["created_at", "updated_at"];

/// Derived fields attached to cached lottery records by the application.
/// Never persisted remotely; stripped before transcoding to remote shape.
const LOTTERY_DERIVED: &[&str] = &["participants", "winner"];

/// A named, homogeneous set of records synchronized as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Lotteries,
    Products,
    Orders,
    OrderItems,
    Clients,
    Visuals,
    LotteryParticipants,
    LotteryWinners,
    SiteSettings,
}

impl Collection {
    /// Every synchronized collection, in the order `sync_all` visits them.
    pub const ALL: [Collection; 9] = [
        Collection::Lotteries,
        Collection::Products,
        Collection::Orders,
        Collection::OrderItems,
        Collection::Clients,
        Collection::Visuals,
        Collection::LotteryParticipants,
        Collection::LotteryWinners,
        Collection::SiteSettings,
    ];

    /// Remote table name (underscore-delimited, the authoritative schema).
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Lotteries => "lotteries",
            Collection::Products => "products",
            Collection::Orders => "orders",
            Collection::OrderItems => "order_items",
            Collection::Clients => "clients",
            Collection::Visuals => "visuals",
            Collection::LotteryParticipants => "lottery_participants",
            Collection::LotteryWinners => "lottery_winners",
            Collection::SiteSettings => "site_settings",
        }
    }

    /// Local cache key (medial-capital, the local record convention).
    pub fn cache_key(&self) -> &'static str {
        match self {
            Collection::Lotteries => "lotteries",
            Collection::Products => "products",
            Collection::Orders => "orders",
            Collection::OrderItems => "orderItems",
            Collection::Clients => "clients",
            Collection::Visuals => "visuals",
            Collection::LotteryParticipants => "lotteryParticipants",
            Collection::LotteryWinners => "lotteryWinners",
            Collection::SiteSettings => "siteSettings",
        }
    }

    /// Fields that exist only in the local representation. Stripped before
    /// a record is transcoded to remote shape.
    pub fn local_only_fields(&self) -> &'static [&'static str] {
        match self {
            Collection::Lotteries => LOTTERY_DERIVED,
            _ => &[],
        }
    }

    /// Fields that exist only in the remote representation. Stripped when a
    /// remote row is transcoded to local shape, and never pushed back.
    pub fn remote_only_fields(&self) -> &'static [&'static str] {
        REMOTE_BOOKKEEPING
    }

    /// Look a collection up by its remote table name.
    pub fn from_table(name: &str) -> Option<Collection> {
        Collection::ALL.iter().copied().find(|c| c.table() == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}
