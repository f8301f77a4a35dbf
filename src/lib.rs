//! Meal nutrition analysis
//!
//! Turns a free-text meal description into per-food and total macronutrients.
//! A language model lists the foods and gram amounts; each name is then
//! resolved against a food-composition table by edit-distance similarity and
//! scaled from its per-100 g profile.

pub mod app_state;
pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod services;
