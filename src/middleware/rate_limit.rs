use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Mutex,
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{error::AppError, state::AppState, views};

/// Rate-limit bucket a route group belongs to. Each category carries its own
/// quota and its own counters, so hammering the login form does not starve
/// the read-only API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitCategory {
    Default,
    Login,
    Register,
    AddEdit,
    Delete,
    Api,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub max: u32,
    pub window: Duration,
}

impl RateLimitRule {
    /// Parses a single rule like `5 per minute` or `200 per day`.
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let mut parts = raw.split_whitespace();
        let max = parts
            .next()
            .ok_or_else(|| anyhow::anyhow!("empty rate limit rule"))?
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("invalid rate limit count in '{raw}'"))?;
        if parts.next() != Some("per") {
            anyhow::bail!("expected 'per' in rate limit rule '{raw}'");
        }
        let unit = parts
            .next()
            .ok_or_else(|| anyhow::anyhow!("missing window unit in '{raw}'"))?;
        if parts.next().is_some() {
            anyhow::bail!("trailing tokens in rate limit rule '{raw}'");
        }
        let window = match unit.strip_suffix('s').unwrap_or(unit) {
            "second" => Duration::from_secs(1),
            "minute" => Duration::from_secs(60),
            "hour" => Duration::from_secs(60 * 60),
            "day" => Duration::from_secs(60 * 60 * 24),
            other => anyhow::bail!("unknown rate limit unit '{other}'"),
        };
        Ok(RateLimitRule { max, window })
    }
}

/// A quota is one or more rules that must all hold, e.g.
/// `200 per day, 50 per hour`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitQuota {
    pub rules: Vec<RateLimitRule>,
}

impl RateLimitQuota {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let rules = raw
            .split(',')
            .map(|part| RateLimitRule::parse(part.trim()))
            .collect::<anyhow::Result<Vec<_>>>()?;
        if rules.is_empty() {
            anyhow::bail!("empty rate limit quota");
        }
        Ok(RateLimitQuota { rules })
    }
}

#[derive(Debug, Clone)]
pub struct RateLimits {
    pub default: RateLimitQuota,
    pub login: RateLimitQuota,
    pub register: RateLimitQuota,
    pub add_edit: RateLimitQuota,
    pub delete: RateLimitQuota,
    pub api: RateLimitQuota,
}

struct Window {
    started: Instant,
    count: u32,
}

/// In-process fixed-window limiter keyed by category, client address and
/// rule index. Counters for expired windows are reset lazily on the next
/// request that touches them.
pub struct RateLimiter {
    limits: RateLimits,
    windows: Mutex<HashMap<(LimitCategory, IpAddr, usize), Window>>,
}

impl RateLimiter {
    pub fn new(limits: RateLimits) -> Self {
        RateLimiter {
            limits,
            windows: Mutex::new(HashMap::new()),
        }
    }

    fn quota(&self, category: LimitCategory) -> &RateLimitQuota {
        match category {
            LimitCategory::Default => &self.limits.default,
            LimitCategory::Login => &self.limits.login,
            LimitCategory::Register => &self.limits.register,
            LimitCategory::AddEdit => &self.limits.add_edit,
            LimitCategory::Delete => &self.limits.delete,
            LimitCategory::Api => &self.limits.api,
        }
    }

    pub fn check(&self, category: LimitCategory, ip: IpAddr) -> bool {
        self.check_at(category, ip, Instant::now())
    }

    /// Returns true when the request is admitted. A request counts against
    /// every rule of the quota only when all of them admit it.
    pub fn check_at(&self, category: LimitCategory, ip: IpAddr, now: Instant) -> bool {
        let quota = self.quota(category);
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut admitted = true;
        for (index, rule) in quota.rules.iter().enumerate() {
            let window = windows
                .entry((category, ip, index))
                .or_insert_with(|| Window { started: now, count: 0 });
            if now.duration_since(window.started) >= rule.window {
                window.started = now;
                window.count = 0;
            }
            if window.count >= rule.max {
                admitted = false;
            }
        }
        if admitted {
            for (index, _) in quota.rules.iter().enumerate() {
                if let Some(window) = windows.get_mut(&(category, ip, index)) {
                    window.count += 1;
                }
            }
        }
        admitted
    }
}

fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

/// Route-group middleware enforcing the quota for one [`LimitCategory`].
pub async fn enforce(
    State((state, category)): State<(AppState, LimitCategory)>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&request);
    if !state.limiter.check(category, ip) {
        tracing::warn!(%ip, ?category, "rate limit exceeded");
        if request.uri().path().starts_with("/api") {
            return AppError::RateLimited.into_response();
        }
        return views::error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests. Please try again later.",
        );
    }
    next.run(request).await
}
