//! Listing searches and review statistics.
//!
//! Searches only return bookable listings: active, not deleted and not blocked.

use super::{find, get};
use crate::context::Context;
use crate::error::Result;
use crate::model::{Listing, Review};
use crate::store::{Criteria, DataStore};
use crate::validation::{Rule, ValidationErrors};
use std::cmp::Ordering;

fn bookable<S: DataStore>(ctx: &Context<'_, S>) -> Result<Vec<Listing>> {
    Ok(get::all::<Listing, S>(ctx)?
        .into_iter()
        .filter(Listing::is_bookable)
        .collect())
}

/// Listings priced within the inclusive bounds; either bound may be open.
pub fn in_price_range<S: DataStore>(
    ctx: &Context<'_, S>,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<Vec<Listing>> {
    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            return Err(
                ValidationErrors::single("price", Rule::Range, "minimum price exceeds maximum price").into(),
            );
        }
    }
    Ok(bookable(ctx)?
        .into_iter()
        .filter(|l| min.map_or(true, |lo| l.price_per_night >= lo))
        .filter(|l| max.map_or(true, |hi| l.price_per_night <= hi))
        .collect())
}

pub fn with_capacity<S: DataStore>(ctx: &Context<'_, S>, guests: u32) -> Result<Vec<Listing>> {
    Ok(bookable(ctx)?
        .into_iter()
        .filter(|l| l.max_guests >= guests)
        .collect())
}

/// Listings within `radius_km` of a point, nearest first.
pub fn near<S: DataStore>(
    ctx: &Context<'_, S>,
    latitude: f64,
    longitude: f64,
    radius_km: f64,
) -> Result<Vec<Listing>> {
    let mut errors = ValidationErrors::default();
    if !(-90.0..=90.0).contains(&latitude) {
        errors.push("latitude", Rule::Range, "latitude must be between -90 and 90");
    }
    if !(-180.0..=180.0).contains(&longitude) {
        errors.push("longitude", Rule::Range, "longitude must be between -180 and 180");
    }
    if radius_km <= 0.0 {
        errors.push("radius_km", Rule::Range, "radius must be greater than 0");
    }
    errors.into_result()?;

    let mut hits: Vec<(f64, Listing)> = bookable(ctx)?
        .into_iter()
        .filter_map(|l| l.distance_km(latitude, longitude).map(|d| (d, l)))
        .filter(|(d, _)| *d <= radius_km)
        .collect();
    hits.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    Ok(hits.into_iter().map(|(_, l)| l).collect())
}

/// Live reviews of a listing, newest first.
pub fn reviews_for<S: DataStore>(ctx: &Context<'_, S>, listing_id: &str) -> Result<Vec<Review>> {
    let _listing: Listing = super::load(ctx, listing_id)?;
    let mut reviews: Vec<Review> = find::run(ctx, &Criteria::new().eq("listing_id", listing_id))?;
    reviews.sort_by(|a, b| b.meta.created_at.cmp(&a.meta.created_at));
    Ok(reviews)
}

pub fn recent_reviews<S: DataStore>(
    ctx: &Context<'_, S>,
    listing_id: &str,
    limit: usize,
) -> Result<Vec<Review>> {
    let mut reviews = reviews_for(ctx, listing_id)?;
    reviews.truncate(limit);
    Ok(reviews)
}

/// Mean rating of the listing's rated reviews; 0.0 when there are none.
pub fn average_rating<S: DataStore>(ctx: &Context<'_, S>, listing_id: &str) -> Result<f64> {
    let ratings: Vec<f64> = reviews_for(ctx, listing_id)?
        .iter()
        .filter_map(|r| r.rating.map(f64::from))
        .collect();
    if ratings.is_empty() {
        return Ok(0.0);
    }
    Ok(ratings.iter().sum::<f64>() / ratings.len() as f64)
}
