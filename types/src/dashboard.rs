//! Presentation state for the subscriptions dashboard.
//!
//! Everything here is plain data: the web layer owns a [`DashboardModel`]
//! inside a signal, feeds it whatever the backend returned, and renders from
//! the accessors. Nothing in this module talks to the network or the DOM.

use std::{collections::HashSet, ops::RangeInclusive, time::Duration};

use serde::{Deserialize, Serialize};

use crate::UserSubscription;

/// Rows per page.
pub const PAGE_SIZE: usize = 10;

/// Maximum number of page buttons shown at once.
pub const PAGE_WINDOW: usize = 5;

/// How long the "copied" indicator stays next to a copied value.
pub const COPIED_DISPLAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_users: usize,
    pub active_subscriptions: usize,
}

impl DashboardStats {
    pub fn from_users(users: &[UserSubscription]) -> Self {
        Self {
            total_users: users.len(),
            active_subscriptions: users.iter().filter(|u| u.is_active()).count(),
        }
    }
}

/// Newest first. Ties keep their incoming order.
pub fn sort_newest_first(users: &mut [UserSubscription]) {
    users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Never less than one: an empty list still has a single, empty page.
pub fn total_pages(total: usize) -> usize {
    total.div_ceil(PAGE_SIZE).max(1)
}

/// Page numbers to show in the pagination strip.
///
/// At most [`PAGE_WINDOW`] pages, centered on `current` and pinned to the
/// first or last pages near either end.
pub fn page_window(current: usize, total_pages: usize) -> RangeInclusive<usize> {
    if total_pages <= PAGE_WINDOW {
        1..=total_pages
    } else if current <= 3 {
        1..=PAGE_WINDOW
    } else if current >= total_pages - 2 {
        (total_pages - 4)..=total_pages
    } else {
        (current - 2)..=(current + 2)
    }
}

/// Identifies one copy action, so a stale timer can't clear a newer
/// indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyTicket(u64);

/// The dashboard's view-model.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardModel {
    users: Vec<UserSubscription>,
    stats: DashboardStats,
    current_page: usize,
    syncing_all: bool,
    syncing_users: HashSet<i64>,
    copied: Option<(String, CopyTicket)>,
    next_ticket: u64,
}

impl Default for DashboardModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardModel {
    pub fn new() -> Self {
        Self {
            users: Vec::new(),
            stats: DashboardStats::default(),
            current_page: 1,
            syncing_all: false,
            syncing_users: HashSet::new(),
            copied: None,
            next_ticket: 0,
        }
    }

    pub fn with_users(users: Vec<UserSubscription>) -> Self {
        let mut this = Self::new();
        this.replace_users(users);
        this
    }

    /// Replace the user list with a fresh fetch and recompute everything
    /// derived from it.
    ///
    /// This is the only way the list changes. It never merges with the
    /// previous contents.
    pub fn replace_users(&mut self, mut users: Vec<UserSubscription>) {
        sort_newest_first(&mut users);
        self.stats = DashboardStats::from_users(&users);
        self.users = users;
        self.go_to_page(self.current_page as i64);
    }

    /// All users, newest first.
    pub fn users(&self) -> &[UserSubscription] {
        &self.users
    }

    pub fn stats(&self) -> DashboardStats {
        self.stats
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.users.len())
    }

    /// Move to `page`, clamped into the valid range. With no users there is
    /// a single empty page.
    pub fn go_to_page(&mut self, page: i64) {
        let last = self.total_pages() as i64;
        self.current_page = page.clamp(1, last) as usize;
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.current_page as i64 + 1);
    }

    pub fn previous_page(&mut self) {
        self.go_to_page(self.current_page as i64 - 1);
    }

    pub fn first_page(&mut self) {
        self.go_to_page(1);
    }

    pub fn last_page(&mut self) {
        self.go_to_page(self.total_pages() as i64);
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    /// The users on the current page.
    pub fn page(&self) -> &[UserSubscription] {
        let start = ((self.current_page - 1) * PAGE_SIZE).min(self.users.len());
        let end = (start + PAGE_SIZE).min(self.users.len());
        &self.users[start..end]
    }

    pub fn page_window(&self) -> RangeInclusive<usize> {
        page_window(self.current_page, self.total_pages())
    }

    /// 1-based, inclusive positions of the rows on the current page, or
    /// `None` when there is nothing to show.
    pub fn showing_range(&self) -> Option<(usize, usize)> {
        let len = self.page().len();
        if len == 0 {
            return None;
        }
        let first = (self.current_page - 1) * PAGE_SIZE + 1;
        Some((first, first + len - 1))
    }

    /// Mark a sync-all as in flight. Returns `false` if one already is, in
    /// which case the caller must not start another.
    pub fn begin_sync(&mut self) -> bool {
        if self.syncing_all {
            return false;
        }
        self.syncing_all = true;
        true
    }

    /// Complete a sync-all with the result of the follow-up re-fetch.
    pub fn finish_sync<E>(&mut self, refetched: Result<Vec<UserSubscription>, E>) -> Result<(), E> {
        self.syncing_all = false;
        self.replace_users(refetched?);
        Ok(())
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing_all
    }

    pub fn begin_user_sync(&mut self, user_id: i64) -> bool {
        self.syncing_users.insert(user_id)
    }

    pub fn finish_user_sync<E>(
        &mut self,
        user_id: i64,
        refetched: Result<Vec<UserSubscription>, E>,
    ) -> Result<(), E> {
        self.syncing_users.remove(&user_id);
        self.replace_users(refetched?);
        Ok(())
    }

    pub fn is_user_syncing(&self, user_id: i64) -> bool {
        self.syncing_users.contains(&user_id)
    }

    /// Record that `value` was copied. Hand the ticket back to
    /// [`DashboardModel::clear_copied`] once [`COPIED_DISPLAY`] has passed.
    pub fn mark_copied(&mut self, value: impl Into<String>) -> CopyTicket {
        self.next_ticket += 1;
        let ticket = CopyTicket(self.next_ticket);
        self.copied = Some((value.into(), ticket));
        ticket
    }

    /// Clear the indicator, unless something else was copied since.
    pub fn clear_copied(&mut self, ticket: CopyTicket) {
        if self.copied.as_ref().is_some_and(|(_, t)| *t == ticket) {
            self.copied = None;
        }
    }

    pub fn copied_value(&self) -> Option<&str> {
        self.copied.as_ref().map(|(value, _)| value.as_str())
    }

    pub fn is_copied(&self, value: &str) -> bool {
        self.copied_value() == Some(value)
    }
}
