use crate::context::Context;
use crate::error::Result;
use crate::model::Entity;
use crate::store::DataStore;

/// Must-exist lookup by id. Soft-deleted entities are still returned.
pub fn run<E: Entity, S: DataStore>(ctx: &Context<'_, S>, id: &str) -> Result<E> {
    super::load(ctx, id)
}

/// Every live entity of the kind.
pub fn all<E: Entity, S: DataStore>(ctx: &Context<'_, S>) -> Result<Vec<E>> {
    Ok(ctx
        .store
        .get_all::<E>()?
        .into_iter()
        .filter(|e| !e.is_deleted())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::delete;
    use crate::model::{Account, Amenity};
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn missing_id_is_not_found() {
        let fx = StoreFixture::new();
        let err = run::<Amenity, _>(&fx.ctx(), "nope").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn all_skips_deleted() {
        let fx = StoreFixture::new().with_account("alice").with_account("bob");
        delete::run::<Account, _>(&fx.ctx(), &fx.accounts[0].meta.id).unwrap();

        let live: Vec<Account> = all(&fx.ctx()).unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].username, "bob");

        // still reachable by id
        let gone: Account = run(&fx.ctx(), &fx.accounts[0].meta.id).unwrap();
        assert!(gone.meta.is_deleted);
    }
}
