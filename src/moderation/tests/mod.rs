//! Unit tests for the moderation pipeline.
