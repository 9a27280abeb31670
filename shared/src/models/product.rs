//! Product Model

use serde::{Deserialize, Serialize};

/// Catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Price in cents
    pub price: i64,
    /// triggers | rooms | bundles | ...
    pub category: String,
    /// Permanent | Gifting | Premium | Bundle | ...
    #[serde(rename = "type")]
    pub product_type: String,
    pub image_url: String,
    pub video_url: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub is_gift: bool,
    pub login_method: Option<String>,
    #[serde(default)]
    pub vip_required: bool,
    #[serde(default)]
    pub sex_room_needed: bool,
    #[serde(default = "default_true")]
    pub pc_support: bool,
    #[serde(default = "default_true")]
    pub mobile_support: bool,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub category: String,
    #[serde(rename = "type")]
    pub product_type: String,
    pub image_url: String,
    pub video_url: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub is_gift: bool,
    pub login_method: Option<String>,
    #[serde(default)]
    pub vip_required: bool,
    #[serde(default)]
    pub sex_room_needed: bool,
    #[serde(default = "default_true")]
    pub pc_support: bool,
    #[serde(default = "default_true")]
    pub mobile_support: bool,
}

/// Update product payload, absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub features: Option<Vec<String>>,
    pub is_gift: Option<bool>,
    pub login_method: Option<String>,
    pub vip_required: Option<bool>,
    pub sex_room_needed: Option<bool>,
    pub pc_support: Option<bool>,
    pub mobile_support: Option<bool>,
}

impl Product {
    pub fn from_create(id: String, data: ProductCreate) -> Self {
        Self {
            id,
            name: data.name,
            description: data.description,
            price: data.price,
            category: data.category,
            product_type: data.product_type,
            image_url: data.image_url,
            video_url: data.video_url,
            features: data.features,
            is_gift: data.is_gift,
            login_method: data.login_method,
            vip_required: data.vip_required,
            sex_room_needed: data.sex_room_needed,
            pc_support: data.pc_support,
            mobile_support: data.mobile_support,
        }
    }

    /// Overlay the present fields of `update`
    pub fn apply(&mut self, update: ProductUpdate) {
        if let Some(v) = update.name {
            self.name = v;
        }
        if let Some(v) = update.description {
            self.description = v;
        }
        if let Some(v) = update.price {
            self.price = v;
        }
        if let Some(v) = update.category {
            self.category = v;
        }
        if let Some(v) = update.product_type {
            self.product_type = v;
        }
        if let Some(v) = update.image_url {
            self.image_url = v;
        }
        if update.video_url.is_some() {
            self.video_url = update.video_url;
        }
        if let Some(v) = update.features {
            self.features = v;
        }
        if let Some(v) = update.is_gift {
            self.is_gift = v;
        }
        if update.login_method.is_some() {
            self.login_method = update.login_method;
        }
        if let Some(v) = update.vip_required {
            self.vip_required = v;
        }
        if let Some(v) = update.sex_room_needed {
            self.sex_room_needed = v;
        }
        if let Some(v) = update.pc_support {
            self.pc_support = v;
        }
        if let Some(v) = update.mobile_support {
            self.mobile_support = v;
        }
    }
}

fn default_true() -> bool {
    true
}
