pub mod chat_log;
pub mod command;
pub mod dispatcher;
pub mod llm_client;
pub mod query_agent;
