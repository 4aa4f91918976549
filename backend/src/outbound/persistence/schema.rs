//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation. The journal tables belong to the wider application and are
//! read here only for aggregate statistics.

diesel::table! {
    /// Application accounts, including the three merge-state columns.
    accounts (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Login name, unique.
        username -> Varchar,
        /// Contact address, unique.
        email -> Varchar,
        /// Optional given name.
        first_name -> Nullable<Varchar>,
        /// Public-facing name used in profile URLs.
        public_username -> Varchar,
        /// Free-form profile biography.
        bio -> Nullable<Text>,
        /// Avatar image location.
        avatar_url -> Nullable<Text>,
        /// Hero image location.
        hero_image_url -> Nullable<Text>,
        /// Whether the individual profile is publicly visible.
        is_profile_public -> Bool,
        /// Active merge, when the account is merged.
        merge_id -> Nullable<Uuid>,
        /// Pre-merge public name, kept for restoration on unmerge.
        original_public_username -> Nullable<Varchar>,
        /// Whether the account is currently merged.
        is_merged -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp (auto-updated by trigger).
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Merge proposals; rows are terminal once status leaves `pending` and
    /// are never deleted.
    account_merge_invitations (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Proposing account.
        inviter_id -> Uuid,
        /// Invited account.
        invited_id -> Uuid,
        /// Optional message, bounded at 500 characters.
        message -> Nullable<Varchar>,
        /// `pending`, `accepted`, `declined`, or `cancelled`.
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Expiry instant; checked lazily at accept time.
        expires_at -> Timestamptz,
        /// When a party acted on the proposal.
        responded_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Active merges; a row exists exactly while the pair is merged.
    account_merges (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// The inviting account.
        user1_id -> Uuid,
        /// The invited account.
        user2_id -> Uuid,
        /// Globally unique public identifier, immutable once committed.
        slug -> Varchar,
        /// Versioned display-preference document.
        settings -> Jsonb,
        /// When the merge was formed.
        merged_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only ledger of merge and unmerge transitions.
    account_merge_history (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// `merged` or `unmerged`.
        event -> Varchar,
        /// Canonically-first participant (smaller UUID).
        account_a_id -> Uuid,
        /// Canonically-second participant.
        account_b_id -> Uuid,
        /// The merge slug involved.
        slug -> Varchar,
        /// The account whose action executed the transition.
        initiated_by -> Uuid,
        /// Whole days the merge lasted (unmerge entries only).
        duration_days -> Nullable<Int8>,
        /// Free-form reason (unmerge entries only).
        reason -> Nullable<Varchar>,
        /// When the transition was recorded.
        recorded_at -> Timestamptz,
    }
}

diesel::table! {
    /// Permanent slug-to-pair records; intentionally never deleted on
    /// unmerge, they route the post-dissolution choice page.
    merge_url_redirects (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// The merge that created the record (row may be gone).
        merge_id -> Uuid,
        /// The slug the pair presented under.
        merge_slug -> Varchar,
        /// The inviting account at merge time.
        user1_id -> Uuid,
        /// The invited account at merge time.
        user2_id -> Uuid,
        /// Inviter's login name at merge time.
        original_username1 -> Varchar,
        /// Invited account's login name at merge time.
        original_username2 -> Varchar,
        /// Inviter's public name at merge time.
        original_public_username1 -> Varchar,
        /// Invited account's public name at merge time.
        original_public_username2 -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Journal entries owned by the wider application; read-only here.
    journal_entries (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning account.
        account_id -> Uuid,
        /// Whether the entry is publicly visible.
        is_public -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Media attached to journal entries; read-only here.
    entry_media (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning journal entry.
        entry_id -> Uuid,
        /// `photo` or `video`.
        kind -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Application-wide key/value settings store; read-only here.
    app_settings (key) {
        /// Setting name.
        key -> Varchar,
        /// Raw setting value.
        value -> Varchar,
    }
}

diesel::joinable!(entry_media -> journal_entries (entry_id));

diesel::allow_tables_to_appear_in_same_query!(
    accounts,
    account_merge_invitations,
    account_merges,
    account_merge_history,
    merge_url_redirects,
    journal_entries,
    entry_media,
);
