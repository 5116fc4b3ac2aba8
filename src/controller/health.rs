use crate::common::{ApiResponse, StatusCode};
use axum::extract::ConnectInfo;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::net::SocketAddr;

pub const HEALTH_MESSAGE: &str = "Backend Working";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthPayload {
    pub data: &'static str,
    pub your_ip: String,
    pub timestamp: String,
}

/// `GET /`
pub async fn health(ConnectInfo(peer): ConnectInfo<SocketAddr>) -> ApiResponse<HealthPayload> {
    let payload = HealthPayload {
        data: "hello",
        your_ip: peer.ip().to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    ApiResponse::send(StatusCode::Ok, HEALTH_MESSAGE, Some(payload))
}
