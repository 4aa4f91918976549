//! Public profile resolution service.
//!
//! Resolves a public path segment in a fixed order: a redirect slug wins
//! over account names, an active merge wins over its residual choice page,
//! and a currently-merged account is never a terminal resource. Resolution
//! is a pure read; resolving the same key twice without intervening state
//! change yields the same result.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::ports::{
    PublicContentStats, PublicContentStatsError, PublicProfileQuery, PublicProfileRepository,
    PublicProfileRepositoryError, ResolveProfileRequest,
};
use crate::domain::{
    Account, AccountId, BioDisplay, ChoicePageView, IndividualProfileView, Merge,
    MergedProfileView, ProfileCard, ResolvedProfile, UrlRedirect,
};

fn map_profile_error(error: PublicProfileRepositoryError) -> Error {
    match error {
        PublicProfileRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("profile repository unavailable: {message}"))
        }
        PublicProfileRepositoryError::Query { message } => {
            Error::internal(format!("profile repository error: {message}"))
        }
    }
}

fn map_stats_error(error: PublicContentStatsError) -> Error {
    match error {
        PublicContentStatsError::Connection { message } => {
            Error::service_unavailable(format!("content stats unavailable: {message}"))
        }
        PublicContentStatsError::Query { message } => {
            Error::internal(format!("content stats error: {message}"))
        }
    }
}

fn combine_bios(user1: &Account, user2: &Account) -> Option<String> {
    let first = user1.bio.as_deref().map(str::trim).filter(|b| !b.is_empty());
    let second = user2.bio.as_deref().map(str::trim).filter(|b| !b.is_empty());
    match (first, second) {
        (Some(a), Some(b)) => Some(format!("{a}\n\n{b}")),
        (Some(a), None) => Some(a.to_owned()),
        (None, Some(b)) => Some(b.to_owned()),
        (None, None) => None,
    }
}

/// Public profile resolver over the read repository and stats ports.
#[derive(Clone)]
pub struct ProfileResolverService<P, C> {
    profiles: Arc<P>,
    stats: Arc<C>,
}

impl<P, C> ProfileResolverService<P, C> {
    /// Create a new resolver over the given ports.
    pub fn new(profiles: Arc<P>, stats: Arc<C>) -> Self {
        Self { profiles, stats }
    }
}

impl<P, C> ProfileResolverService<P, C>
where
    P: PublicProfileRepository,
    C: PublicContentStats,
{
    async fn required_account(&self, account_id: &AccountId) -> Result<Account, Error> {
        self.profiles
            .find_account_by_id(account_id)
            .await
            .map_err(map_profile_error)?
            .ok_or_else(|| Error::internal(format!("merge member {account_id} has no account row")))
    }

    async fn merged_view(&self, merge: Merge) -> Result<ResolvedProfile, Error> {
        let user1 = self.required_account(&merge.user1_id).await?;
        let user2 = self.required_account(&merge.user2_id).await?;

        let stats = self
            .stats
            .stats_for_accounts(&[user1.id, user2.id])
            .await
            .map_err(map_stats_error)?;

        let display = merge.settings.profile_display;
        let bio = match display.bio_display {
            BioDisplay::User1 => user1.bio.clone(),
            BioDisplay::User2 => user2.bio.clone(),
            BioDisplay::Combine => combine_bios(&user1, &user2),
        };
        let pick = |selected: AccountId, field: fn(&Account) -> Option<String>| {
            if selected == user1.id {
                field(&user1)
            } else {
                field(&user2)
            }
        };
        let avatar_url = pick(merge.member_for(display.avatar_display), |account| {
            account.avatar_url.clone()
        });
        let hero_image_url = pick(merge.member_for(display.hero_image_display), |account| {
            account.hero_image_url.clone()
        });

        Ok(ResolvedProfile::Merged(MergedProfileView {
            slug: merge.slug,
            display_name: format!("{} & {}", user1.display_name(), user2.display_name()),
            bio,
            avatar_url,
            hero_image_url,
            members: vec![ProfileCard::for_account(&user1), ProfileCard::for_account(&user2)],
            stats,
            display,
            merged_at: merge.merged_at,
        }))
    }

    async fn choice_card(
        &self,
        account_id: AccountId,
        fallback_name: &str,
    ) -> Result<ProfileCard, Error> {
        let account = self
            .profiles
            .find_account_by_id(&account_id)
            .await
            .map_err(map_profile_error)?;

        Ok(account.as_ref().map_or_else(
            || ProfileCard {
                account_id,
                public_username: fallback_name.to_owned(),
                display_name: fallback_name.to_owned(),
                avatar_url: None,
                available: false,
            },
            ProfileCard::for_account,
        ))
    }

    async fn choice_page(&self, redirect: UrlRedirect) -> Result<ResolvedProfile, Error> {
        let first = self
            .choice_card(redirect.user1_id, &redirect.original_public_username1)
            .await?;
        let second = self
            .choice_card(redirect.user2_id, &redirect.original_public_username2)
            .await?;

        Ok(ResolvedProfile::UnmergedChoice(ChoicePageView {
            slug: redirect.merge_slug,
            cards: vec![first, second],
        }))
    }

    async fn individual_view(&self, account: Account) -> Result<ResolvedProfile, Error> {
        let stats = self
            .stats
            .stats_for_accounts(&[account.id])
            .await
            .map_err(map_stats_error)?;

        Ok(ResolvedProfile::Individual(IndividualProfileView {
            account_id: account.id,
            public_username: account.public_username.clone(),
            display_name: account.display_name().to_owned(),
            bio: account.bio,
            avatar_url: account.avatar_url,
            hero_image_url: account.hero_image_url,
            stats,
        }))
    }
}

#[async_trait]
impl<P, C> PublicProfileQuery for ProfileResolverService<P, C>
where
    P: PublicProfileRepository,
    C: PublicContentStats,
{
    async fn resolve(&self, request: ResolveProfileRequest) -> Result<ResolvedProfile, Error> {
        let key = request.key.trim();
        if key.is_empty() {
            return Err(Error::not_found("no public profile matches an empty key"));
        }

        if let Some(lookup) = self
            .profiles
            .find_redirect_by_slug(key)
            .await
            .map_err(map_profile_error)?
        {
            return match lookup.merge {
                Some(merge) => self.merged_view(merge).await,
                None => self.choice_page(lookup.redirect).await,
            };
        }

        if let Some(account) = self
            .profiles
            .find_account_by_public_key(key)
            .await
            .map_err(map_profile_error)?
        {
            if account.is_merged {
                let merge_id = account
                    .merge_id
                    .ok_or_else(|| Error::internal("merged account carries no merge id"))?;
                let merge = self
                    .profiles
                    .find_merge_by_id(merge_id)
                    .await
                    .map_err(map_profile_error)?
                    .ok_or_else(|| Error::internal("merged account points at a missing merge"))?;
                return Ok(ResolvedProfile::RedirectToMerge { slug: merge.slug });
            }
            return self.individual_view(account).await;
        }

        Err(Error::not_found(format!("no public profile matches {key}")))
    }
}

#[cfg(test)]
#[path = "profile_resolver_tests.rs"]
mod tests;
