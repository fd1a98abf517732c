//! Route finders.
//!
//! Both finders are external systems. Each is wrapped behind [`RouteFinder`]
//! so the pipeline only sees a list of targets going in and a [`RouteSet`]
//! in the aizynthfinder tree format coming out.

pub mod aizynthfinder;
pub mod postera;

use anyhow::Result;

use crate::models::RouteSet;

pub use aizynthfinder::AizRouteFinder;
pub use postera::PosRouteFinder;

pub trait RouteFinder {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Find routes for every target. The returned set lists targets in input order.
    fn find_routes(&self, targets: &[String]) -> Result<RouteSet>;
}
