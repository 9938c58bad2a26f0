//! FeedReply command line
//!
//! Runs the annotation engine against saved page snapshots: classify an
//! address, list the units a scan would annotate, or drive one full reply
//! cycle against the generation service.

pub mod cli;
