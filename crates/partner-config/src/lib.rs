// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod schema;
mod loader;
mod credentials;

pub use schema::*;
pub use loader::{config_search_paths, load, CONFIG_FILE_NAME};
pub use credentials::{
    CredentialSource, Credentials, EnvCredentials, DEFAULT_OPENROUTER_MODEL, ENV_EXA_API_KEY,
    ENV_MEM0_API_KEY, ENV_MODEL_NAME, ENV_OPENAI_API_KEY, ENV_OPENROUTER_API_KEY,
};
