use super::{cascade, find};
use super::update::save;
use crate::context::Context;
use crate::error::{HbnbError, Result};
use crate::model::{Account, CascadeAction, Entity};
use crate::store::{Criteria, DataStore};
use tracing::info;

/// Hides the account and all of its listings.
pub fn pause<S: DataStore>(ctx: &Context<'_, S>, id: &str) -> Result<Account> {
    set_active(ctx, id, false, Account::PAUSE_CASCADE)
}

/// Makes a paused account and its listings visible again.
/// A deleted account can never come back.
pub fn reactivate<S: DataStore>(ctx: &Context<'_, S>, id: &str) -> Result<Account> {
    set_active(ctx, id, true, Account::REACTIVATE_CASCADE)
}

fn set_active<S: DataStore>(
    ctx: &Context<'_, S>,
    id: &str,
    active: bool,
    plan: &[CascadeAction],
) -> Result<Account> {
    let mut account: Account = super::load(ctx, id)?;
    if account.is_deleted() {
        let verb = if active { "reactivate" } else { "pause" };
        return Err(HbnbError::Conflict(format!(
            "Cannot {verb} account {id}: it has been deleted"
        )));
    }

    let report = cascade::run(ctx, plan, id)?;
    account.meta.is_active = active;
    account.meta.touch();
    let saved = save(ctx, &account)?;
    info!(
        "account {id} {} ({} listing(s) updated)",
        if active { "reactivated" } else { "paused" },
        report.toggled
    );
    Ok(saved)
}

/// True if `password` matches the live account's stored credential.
pub fn verify_credential<S: DataStore>(ctx: &Context<'_, S>, id: &str, password: &str) -> Result<bool> {
    let account: Account = super::load(ctx, id)?;
    Ok(!account.is_deleted() && account.verify_credential(ctx.hasher, password))
}

pub fn by_email<S: DataStore>(ctx: &Context<'_, S>, email: &str) -> Result<Option<Account>> {
    Ok(find::run::<Account, S>(ctx, &Criteria::new().eq("email", email))?
        .into_iter()
        .next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{delete, link, listings};
    use crate::model::Listing;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn pause_and_reactivate_propagate_to_listings() {
        let fx = StoreFixture::new().with_account("owner").with_listing(0).with_listing(0);
        let id = fx.accounts[0].meta.id.clone();

        let fx = fx.with_amenity("Wifi").with_link(0, 0);
        let wifi = fx.amenities[0].meta.id.clone();
        assert_eq!(listings::in_price_range(&fx.ctx(), None, None).unwrap().len(), 2);

        let paused = pause(&fx.ctx(), &id).unwrap();
        assert!(!paused.meta.is_active);
        for l in &fx.listings {
            let stored: Listing = fx.store.get(&l.meta.id).unwrap().unwrap();
            assert!(!stored.meta.is_active);
        }
        assert!(listings::in_price_range(&fx.ctx(), None, None).unwrap().is_empty());
        assert!(listings::with_capacity(&fx.ctx(), 1).unwrap().is_empty());
        assert!(listings::near(&fx.ctx(), 48.85, 2.35, 5.0).unwrap().is_empty());
        assert!(link::listings_for_amenity(&fx.ctx(), &wifi).unwrap().is_empty());

        let back = reactivate(&fx.ctx(), &id).unwrap();
        assert!(back.meta.is_active);
        let stored: Listing = fx.store.get(&fx.listings[0].meta.id).unwrap().unwrap();
        assert!(stored.meta.is_active);
        assert_eq!(listings::near(&fx.ctx(), 48.85, 2.35, 5.0).unwrap().len(), 2);
        assert_eq!(link::listings_for_amenity(&fx.ctx(), &wifi).unwrap().len(), 1);
    }

    #[test]
    fn deleted_account_cannot_be_reactivated() {
        let fx = StoreFixture::new().with_account("gone");
        let id = fx.accounts[0].meta.id.clone();
        delete::run::<Account, _>(&fx.ctx(), &id).unwrap();

        assert!(reactivate(&fx.ctx(), &id).unwrap_err().is_conflict());
        assert!(pause(&fx.ctx(), &id).unwrap_err().is_conflict());
        let stored: Account = fx.store.get(&id).unwrap().unwrap();
        assert!(stored.meta.is_deleted);
        assert!(!stored.meta.is_active);
    }

    #[test]
    fn credential_check() {
        let fx = StoreFixture::new().with_account("alice");
        let id = fx.accounts[0].meta.id.clone();
        assert!(verify_credential(&fx.ctx(), &id, "Passw0rdOk").unwrap());
        assert!(!verify_credential(&fx.ctx(), &id, "wrong").unwrap());

        delete::run::<Account, _>(&fx.ctx(), &id).unwrap();
        assert!(!verify_credential(&fx.ctx(), &id, "Passw0rdOk").unwrap());
    }

    #[test]
    fn lookup_by_email() {
        let fx = StoreFixture::new().with_account("alice");
        let found = by_email(&fx.ctx(), "alice@example.com").unwrap().unwrap();
        assert_eq!(found.username, "alice");
        assert!(by_email(&fx.ctx(), "nobody@example.com").unwrap().is_none());
    }
}
