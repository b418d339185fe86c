//! Request classifier — spec.md §4.1, a direct port of the original
//! `isWhitelisted` algorithm from `pkg/rendora/filter.go`, kept as a pure
//! function with no `self`, no I/O, and no locking.

use rendora_types::{ListPolicy, PathFilter, UserAgentFilter};
use rendora_types::FilterPolicy;

/// True if the request should be rendered by the Engine; false if it should
/// be proxied or served statically untouched.
pub fn should_render(policy: &FilterPolicy, user_agent: &str, uri: &str) -> bool {
    passes_user_agent_stage(&policy.user_agent, user_agent) && passes_path_stage(&policy.paths, uri)
}

fn passes_user_agent_stage(filter: &UserAgentFilter, user_agent: &str) -> bool {
    let lower_ua = user_agent.to_lowercase();
    let keyword_match = filter
        .keyword_exceptions
        .iter()
        .any(|k| lower_ua.contains(k.to_lowercase().as_str()));
    let exact_match = filter.exact_exceptions.iter().any(|e| e == user_agent);

    match filter.default {
        ListPolicy::Whitelist => {
            if !filter.keyword_exceptions.is_empty() && keyword_match {
                return false;
            }
            if !filter.exact_exceptions.is_empty() && exact_match {
                return false;
            }
            true
        }
        ListPolicy::Blacklist => {
            if filter.keyword_exceptions.is_empty() && filter.exact_exceptions.is_empty() {
                return false;
            }
            if !filter.keyword_exceptions.is_empty() && !keyword_match {
                return false;
            }
            if !filter.exact_exceptions.is_empty() && !exact_match {
                return false;
            }
            true
        }
    }
}

fn passes_path_stage(filter: &PathFilter, uri: &str) -> bool {
    let exact_match = filter.exact_exceptions.iter().any(|e| e == uri);
    let prefix_match = filter.prefix_exceptions.iter().any(|p| uri.starts_with(p.as_str()));

    match filter.default {
        ListPolicy::Blacklist => {
            if !filter.exact_exceptions.is_empty() && exact_match {
                return true;
            }
            if !filter.prefix_exceptions.is_empty() && prefix_match {
                return true;
            }
            false
        }
        ListPolicy::Whitelist => {
            if !filter.exact_exceptions.is_empty() && exact_match {
                return false;
            }
            if !filter.prefix_exceptions.is_empty() && prefix_match {
                return false;
            }
            true
        }
    }
}
