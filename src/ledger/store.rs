use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::errors::{LedgerError, LedgerResult};

use super::{
    entry::{Entry, EntryDraft, EntryId, EntryKind, EntryPatch},
    month::{shift_one_month, MonthKey},
    totals::{is_overdue, MonthTotals},
};

/// Month-keyed ledger: the single owner of every entry and of id allocation.
///
/// Callers never touch buckets directly. An entry always lives in the bucket of its own
/// date's month and buckets that become empty are pruned.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    buckets: BTreeMap<MonthKey, Vec<Entry>>,
    next_id: EntryId,
    selected: MonthKey,
}

impl LedgerStore {
    pub fn new(selected: MonthKey) -> Self {
        Self {
            buckets: BTreeMap::new(),
            next_id: 1,
            selected,
        }
    }

    /// Rebuilds a store from persisted buckets.
    ///
    /// Entries are re-bucketed by their own date, invalid entries are dropped, and
    /// duplicate ids are reassigned so the uniqueness invariant holds after load.
    pub fn from_history(
        history: BTreeMap<MonthKey, Vec<Entry>>,
        id_counter: EntryId,
        selected: MonthKey,
    ) -> Self {
        let mut store = Self::new(selected);
        let mut seen = HashSet::new();
        let mut needs_new_id = Vec::new();

        for (key, entries) in history {
            for entry in entries {
                if let Err(err) = entry.to_draft().validate() {
                    warn!(id = entry.id, month = %key, "dropping stored entry: {err}");
                    continue;
                }
                if entry.month_key() != key {
                    debug!(id = entry.id, from = %key, to = %entry.month_key(), "re-bucketing stored entry");
                }
                if entry.id == 0 || !seen.insert(entry.id) {
                    needs_new_id.push(entry);
                } else {
                    store.insert(entry);
                }
            }
        }

        let max_id = seen.iter().copied().max().unwrap_or(0);
        store.next_id = id_counter.max(max_id + 1).max(1);
        for mut entry in needs_new_id {
            let fresh = store.allocate_id();
            warn!(old = entry.id, new = fresh, "reassigning duplicate entry id");
            entry.id = fresh;
            store.insert(entry);
        }
        store
    }

    /// Hands out the next entry id. Ids only ever grow.
    pub fn allocate_id(&mut self) -> EntryId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// The id the next created entry will receive (persisted as `idCounter`).
    pub fn id_counter(&self) -> EntryId {
        self.next_id
    }

    pub fn add_entry(&mut self, draft: EntryDraft) -> LedgerResult<Entry> {
        draft.validate()?;
        let id = self.allocate_id();
        let entry = draft.into_entry(id);
        debug!(id, month = %entry.month_key(), "entry added");
        self.insert(entry.clone());
        Ok(entry)
    }

    pub fn update_entry(&mut self, id: EntryId, patch: EntryPatch) -> LedgerResult<Entry> {
        patch.validate()?;
        let (key, index) = self.locate(id).ok_or(LedgerError::NotFound(id))?;

        let mut updated = self.get(id).ok_or(LedgerError::NotFound(id))?.clone();
        patch.apply(&mut updated);
        let target = updated.month_key();

        if target == key {
            if let Some(bucket) = self.buckets.get_mut(&key) {
                bucket[index] = updated.clone();
            }
        } else {
            self.take(key, index);
            debug!(id, from = %key, to = %target, "entry moved between months");
            self.insert(updated.clone());
        }
        Ok(updated)
    }

    pub fn remove_entry(&mut self, id: EntryId) -> LedgerResult<Entry> {
        let (key, index) = self.locate(id).ok_or(LedgerError::NotFound(id))?;
        let removed = self.take(key, index).ok_or(LedgerError::NotFound(id))?;
        debug!(id, month = %key, "entry removed");
        Ok(removed)
    }

    pub fn toggle_paid(&mut self, id: EntryId) -> LedgerResult<Entry> {
        let entry = self.get_mut(id).ok_or(LedgerError::NotFound(id))?;
        entry.paid = !entry.paid;
        debug!(id, paid = entry.paid, "entry paid flag toggled");
        Ok(entry.clone())
    }

    /// Copies an entry on the same date under a fresh id, unpaid.
    pub fn duplicate_entry(&mut self, id: EntryId) -> LedgerResult<Entry> {
        let source = self.get(id).ok_or(LedgerError::NotFound(id))?.clone();
        let copy = self.copy_as_new(&source, source.date);
        debug!(source = id, id = copy.id, "entry duplicated");
        Ok(copy)
    }

    /// Duplicates every entry of `month` into the following month, clamping days that do
    /// not exist there to the last day of that month.
    pub fn roll_month_forward(&mut self, month: MonthKey) -> LedgerResult<Vec<Entry>> {
        let sources = match self.buckets.get(&month) {
            Some(bucket) if !bucket.is_empty() => bucket.clone(),
            _ => {
                return Err(LedgerError::NoOp(format!(
                    "month {month} has no entries to roll forward"
                )))
            }
        };

        let target = month.next();
        MonthKey::new(target.year(), target.month())?;

        let created: Vec<Entry> = sources
            .iter()
            .map(|source| self.copy_as_new(source, shift_one_month(source.date)))
            .collect();
        debug!(from = %month, to = %target, count = created.len(), "month rolled forward");
        Ok(created)
    }

    /// Non-empty month keys, most recent first.
    pub fn list_month_keys(&self) -> Vec<MonthKey> {
        self.buckets.keys().rev().copied().collect()
    }

    /// Entries of one month ordered by date; same-date entries keep insertion order.
    pub fn entries_for_month(&self, month: MonthKey) -> Vec<&Entry> {
        let mut entries: Vec<&Entry> = self
            .buckets
            .get(&month)
            .map(|bucket| bucket.iter().collect())
            .unwrap_or_default();
        entries.sort_by_key(|entry| entry.date);
        entries
    }

    pub fn totals_for(&self, month: MonthKey) -> MonthTotals {
        MonthTotals::compute(self.buckets.get(&month).into_iter().flatten())
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.buckets
            .values()
            .flat_map(|bucket| bucket.iter())
            .find(|entry| entry.id == id)
    }

    pub fn select_month(&mut self, month: MonthKey) {
        self.selected = month;
    }

    pub fn selected_month(&self) -> MonthKey {
        self.selected
    }

    pub fn selected_entries(&self) -> Vec<&Entry> {
        self.entries_for_month(self.selected)
    }

    pub fn selected_totals(&self) -> MonthTotals {
        self.totals_for(self.selected)
    }

    /// Selected month's entries of one kind, date ordered.
    pub fn selected_entries_of_kind(&self, kind: EntryKind) -> Vec<&Entry> {
        self.selected_entries()
            .into_iter()
            .filter(|entry| entry.kind == kind)
            .collect()
    }

    pub fn income_entries(&self) -> Vec<&Entry> {
        self.selected_entries_of_kind(EntryKind::Income)
    }

    pub fn expense_entries(&self) -> Vec<&Entry> {
        self.selected_entries_of_kind(EntryKind::Expense)
    }

    pub fn overdue_entries(&self, today: NaiveDate) -> Vec<&Entry> {
        self.selected_entries()
            .into_iter()
            .filter(|entry| is_overdue(entry, today))
            .collect()
    }

    pub fn history(&self) -> &BTreeMap<MonthKey, Vec<Entry>> {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Appends already-validated drafts as new unpaid entries, each in its own month.
    ///
    /// Validation runs over every draft first, so a failure leaves the store untouched.
    pub fn append_drafts(&mut self, drafts: Vec<EntryDraft>) -> LedgerResult<Vec<Entry>> {
        for draft in &drafts {
            draft.validate()?;
        }
        drafts
            .into_iter()
            .map(|draft| self.add_entry(draft))
            .collect()
    }

    /// Replaces the contents of `month` with `entries`, assigning fresh ids.
    ///
    /// The `paid` flag of each incoming entry is kept. An incoming entry dated outside
    /// `month` still lands in its own month's bucket.
    pub fn replace_month(&mut self, month: MonthKey, entries: Vec<Entry>) -> LedgerResult<Vec<Entry>> {
        for entry in &entries {
            entry.to_draft().validate()?;
        }
        self.buckets.remove(&month);
        let stored = self.insert_fresh(entries);
        debug!(month = %month, count = stored.len(), "month replaced");
        Ok(stored)
    }

    /// Replaces every bucket with `entries`, assigning fresh ids.
    pub fn replace_all(&mut self, entries: Vec<Entry>) -> LedgerResult<Vec<Entry>> {
        for entry in &entries {
            entry.to_draft().validate()?;
        }
        self.buckets.clear();
        let stored = self.insert_fresh(entries);
        debug!(count = stored.len(), "history replaced");
        Ok(stored)
    }

    fn insert_fresh(&mut self, entries: Vec<Entry>) -> Vec<Entry> {
        entries
            .into_iter()
            .map(|entry| {
                let paid = entry.paid;
                let mut stored = entry.to_draft().into_entry(self.allocate_id());
                stored.paid = paid;
                self.insert(stored.clone());
                stored
            })
            .collect()
    }

    fn copy_as_new(&mut self, source: &Entry, date: NaiveDate) -> Entry {
        let copy = Entry {
            id: self.allocate_id(),
            date,
            paid: false,
            ..source.clone()
        };
        self.insert(copy.clone());
        copy
    }

    fn insert(&mut self, entry: Entry) {
        self.buckets.entry(entry.month_key()).or_default().push(entry);
    }

    fn take(&mut self, key: MonthKey, index: usize) -> Option<Entry> {
        let bucket = self.buckets.get_mut(&key)?;
        if index >= bucket.len() {
            return None;
        }
        let removed = bucket.remove(index);
        if bucket.is_empty() {
            self.buckets.remove(&key);
        }
        Some(removed)
    }

    fn locate(&self, id: EntryId) -> Option<(MonthKey, usize)> {
        self.buckets.iter().find_map(|(key, bucket)| {
            bucket
                .iter()
                .position(|entry| entry.id == id)
                .map(|index| (*key, index))
        })
    }

    fn get_mut(&mut self, id: EntryId) -> Option<&mut Entry> {
        self.buckets
            .values_mut()
            .flat_map(|bucket| bucket.iter_mut())
            .find(|entry| entry.id == id)
    }
}
