//! tripgraph - multi-stage travel itinerary planner
//!
//! A directed-graph workflow engine that turns a travel request into a day-by-day
//! itinerary: validate, collect places and weather concurrently, enrich with
//! LLM research, build day plans, then critique and optimize the result in a
//! bounded loop before assembling the final itinerary.
//!
//! The library exposes [`planner::Planner`] as the main entry point; the
//! stage graph underneath is in [`graph`], external data sources in
//! [`connectors`], and text generation in [`llm`].

pub mod cli;
pub mod config;
pub mod connectors;
pub mod domain;
pub mod error;
pub mod graph;
pub mod llm;
pub mod planner;

pub use error::PlannerError;
pub use planner::Planner;
