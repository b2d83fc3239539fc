//! NYC Accident Risk Predictor API Library
//!
//! This library exposes a pre-trained accident-risk classifier over HTTP:
//! a request's coordinate and temporal fields are turned into a fixed-order
//! feature vector, standardized with a pre-fitted scaler, and scored by a
//! frozen softmax classifier.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `factors`: Contributing-factor catalog.
//! - `features`: Feature derivation and the fitted column order.
//! - `handlers`: HTTP request handlers and the prediction pipeline.
//! - `model`: Frozen scaler/classifier artifacts and their loader.
//! - `models`: API request/response models.

pub mod config;
pub mod errors;
pub mod factors;
pub mod features;
pub mod handlers;
pub mod model;
pub mod models;
