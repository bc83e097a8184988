/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `history`  — Browse, rename, export and delete stored conversations
- `settings` — Inspect and edit persisted settings and chat preferences

Each handler opens the conversation store from the loaded configuration
and prints its results to stdout.
*/

// Conversation history handler
pub mod history;

// Settings and preferences handler
pub mod settings;
