// src/models/registry.rs
// DOCUMENTATION: Admin registration table
// PURPOSE: Declare, per entity, which fields the admin surface lists, searches and filters on

use serde::Serialize;

/// How one entity is exposed through the admin API
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AdminRegistration {
    pub entity: &'static str,
    pub list_display: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    pub list_filter: &'static [&'static str],
    pub ordering: &'static [&'static str],
}

pub const PLACE_ADMIN: AdminRegistration = AdminRegistration {
    entity: "place",
    list_display: &["title", "latitude", "longitude", "images_count"],
    search_fields: &["title", "short_description", "long_description"],
    list_filter: &[],
    ordering: &["title"],
};

pub const PLACE_IMAGE_ADMIN: AdminRegistration = AdminRegistration {
    entity: "place_image",
    list_display: &["place", "order", "url"],
    search_fields: &["place__title"],
    list_filter: &["place"],
    ordering: &["place", "order"],
};

/// Every registered entity, in menu order
pub fn registrations() -> [AdminRegistration; 2] {
    [PLACE_ADMIN, PLACE_IMAGE_ADMIN]
}
