//! # MCP Tool Server
//!
//! Model Context Protocol over stdio: one JSON-RPC 2.0 message per line in,
//! one per line out. Six read-only tools expose the index as plain text. Every
//! tool call does a fresh fetch; nothing is cached here.
//!
//! stdout carries protocol frames only, so this module logs through `log`
//! and the binary routes that to a file.

use lib_common::core::FgiError;
use lib_common::markets::cnn::report::complete_report;
use lib_common::markets::cnn::{ComparisonPeriod, CompositeIndex, DISCLAIMER, FearAndGreed};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "fear-greed-index";
pub const DEFAULT_HISTORY_DAYS: u64 = 10;

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

#[derive(Deserialize, Debug)]
struct RpcRequest {
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, PartialEq)]
struct RpcError {
    code: i64,
    message: String,
}

impl RpcError {
    fn new(code: i64, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

fn success(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn failure(id: Value, error: RpcError) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "error": { "code": error.code, "message": error.message } })
}

fn empty_schema() -> Value {
    json!({ "type": "object", "properties": {}, "required": [] })
}

/// The `tools/list` payload.
pub fn tool_definitions() -> Value {
    json!([
        {
            "name": "get_fear_greed_score",
            "description": "Get the current CNN Fear & Greed Index score and rating. Returns the overall market sentiment score (0-100) and rating (Extreme Fear, Fear, Neutral, Greed, Extreme Greed).",
            "inputSchema": empty_schema()
        },
        {
            "name": "get_fear_greed_indicators",
            "description": "Get all individual Fear & Greed indicators with their scores. Includes: Market Momentum, Stock Price Strength, Stock Price Breadth, Put/Call Options, Market Volatility, Safe Haven Demand, Junk Bond Demand.",
            "inputSchema": empty_schema()
        },
        {
            "name": "get_fear_greed_comparison",
            "description": "Get Fear & Greed Index comparison with previous periods. Shows current score vs previous close, 1 week ago, 1 month ago, and 1 year ago.",
            "inputSchema": empty_schema()
        },
        {
            "name": "get_trading_signal",
            "description": "Get a trading signal based on the Fear & Greed Index. Returns STRONG BUY, BUY, HOLD, SELL, or STRONG SELL with explanation.",
            "inputSchema": empty_schema()
        },
        {
            "name": "get_fear_greed_history",
            "description": "Get historical Fear & Greed Index data.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "days": {
                        "type": "integer",
                        "description": "Number of days of history to return (default: 10)",
                        "default": DEFAULT_HISTORY_DAYS
                    }
                },
                "required": []
            }
        },
        {
            "name": "get_complete_report",
            "description": "Get a complete Fear & Greed Index report with all data.",
            "inputSchema": empty_schema()
        }
    ])
}

pub fn score_text(index: &CompositeIndex) -> String {
    let ts = index
        .timestamp
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "N/A".to_string());
    format!(
        "CNN Fear & Greed Index\n======================\nScore: {:.1}/100\nRating: {}\nTimestamp: {}",
        index.score, index.rating, ts
    )
}

pub fn indicators_text(index: &CompositeIndex) -> String {
    let mut lines = vec!["Fear & Greed Indicators".to_string(), "=".repeat(50)];
    lines.extend(
        index
            .indicators
            .iter()
            .map(|ind| format!("{}: {:.1} ({})", ind.name, ind.score, ind.rating)),
    );
    lines.join("\n")
}

pub fn comparison_text(index: &CompositeIndex) -> String {
    let mut text = format!(
        "Fear & Greed Comparison\n=======================\nCurrent Score: {:.1}",
        index.score
    );
    for delta in index.comparisons() {
        text.push_str(&format!(
            "\n{}: {:.1} (change: {})",
            delta.period.label(),
            delta.previous,
            delta.signed()
        ));
    }
    text
}

pub fn signal_text(index: &CompositeIndex) -> String {
    let signal = index.signal();
    format!(
        "Trading Signal: {}\n================\nScore: {:.1} ({})\n\nAnalysis: {}\n\n{}",
        signal.label(),
        index.score,
        index.rating,
        signal.analysis(),
        DISCLAIMER
    )
}

/// The last `days` points, newest first.
pub fn history_text(index: &CompositeIndex, days: u64) -> String {
    let limit = usize::try_from(days).unwrap_or(usize::MAX);
    let mut lines = vec![format!("Fear & Greed History (Last {} Days)", days), "=".repeat(40)];
    lines.extend(
        index
            .recent_history(limit)
            .iter()
            .rev()
            .map(|p| format!("{}: {:.1} ({})", p.timestamp.format("%Y-%m-%d"), p.score, p.rating)),
    );
    lines.join("\n")
}

const TOOL_NAMES: [&str; 6] = [
    "get_fear_greed_score",
    "get_fear_greed_indicators",
    "get_fear_greed_comparison",
    "get_trading_signal",
    "get_fear_greed_history",
    "get_complete_report",
];

/// Text content of a tool call plus whether it represents a failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    fn into_result(self) -> Value {
        json!({
            "content": [{ "type": "text", "text": self.text }],
            "isError": self.is_error
        })
    }
}

pub struct McpServer {
    fgi: Arc<FearAndGreed>,
}

impl McpServer {
    pub fn new(fgi: Arc<FearAndGreed>) -> Self {
        Self { fgi }
    }

    /// Runs one tool. Unknown names are answered in-band, not as RPC errors.
    pub async fn call_tool(&self, name: &str, arguments: &Value) -> ToolOutput {
        if !TOOL_NAMES.contains(&name) {
            return ToolOutput { text: format!("Unknown tool: {}", name), is_error: true };
        }

        let index = match self.fgi.fetch_latest().await {
            Ok(index) => index,
            Err(e) => return fetch_failed(name, &e),
        };

        let text = match name {
            "get_fear_greed_score" => score_text(&index),
            "get_fear_greed_indicators" => indicators_text(&index),
            "get_fear_greed_comparison" => comparison_text(&index),
            "get_trading_signal" => signal_text(&index),
            "get_fear_greed_history" => {
                let days = arguments
                    .get("days")
                    .and_then(Value::as_u64)
                    .unwrap_or(DEFAULT_HISTORY_DAYS);
                history_text(&index, days)
            }
            _ => complete_report(&index),
        };
        ToolOutput { text, is_error: false }
    }

    async fn dispatch(&self, method: &str, params: &Value) -> Result<Value, RpcError> {
        match method {
            "initialize" => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": { "listChanged": false } },
                "serverInfo": { "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") }
            })),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tool_definitions() })),
            "tools/call" => {
                let name = params
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| RpcError::new(INVALID_PARAMS, "Missing tool name"))?;
                let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
                log::info!("Tool call: {}", name);
                Ok(self.call_tool(name, &arguments).await.into_result())
            }
            other => Err(RpcError::new(METHOD_NOT_FOUND, format!("Method not found: {}", other))),
        }
    }

    /// Handles one input line. Returns the reply frame, or `None` for blank
    /// lines and notifications.
    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let raw: Value = match serde_json::from_str(line) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Unparseable frame: {}", e);
                return Some(failure(Value::Null, RpcError::new(PARSE_ERROR, format!("Parse error: {}", e))));
            }
        };

        let id_hint = raw.get("id").cloned().unwrap_or(Value::Null);
        let request: RpcRequest = match serde_json::from_value(raw) {
            Ok(request) => request,
            Err(e) => {
                return Some(failure(id_hint, RpcError::new(INVALID_REQUEST, format!("Invalid request: {}", e))));
            }
        };

        let Some(id) = request.id else {
            log::debug!("Notification: {}", request.method);
            return None;
        };

        Some(match self.dispatch(&request.method, &request.params).await {
            Ok(result) => success(id, result),
            Err(error) => failure(id, error),
        })
    }

    /// Serves frames from `reader` until EOF, writing replies to `writer`.
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if let Some(reply) = self.handle_line(&line).await {
                let mut frame = serde_json::to_string(&reply).map_err(std::io::Error::other)?;
                frame.push('\n');
                writer.write_all(frame.as_bytes()).await?;
                writer.flush().await?;
            }
        }
        Ok(())
    }
}

fn fetch_failed(tool: &str, e: &FgiError) -> ToolOutput {
    log::error!("Tool {} failed to fetch data: {}", tool, e);
    ToolOutput {
        text: format!("Failed to fetch Fear & Greed data: {}", e),
        is_error: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{client_for, healthy_upstream, sample_document, upstream_with};
    use lib_common::markets::cnn::build_composite_index;
    use wiremock::ResponseTemplate;

    fn sample_index() -> CompositeIndex {
        build_composite_index(&sample_document()).unwrap()
    }

    #[test]
    fn test_six_tools_with_schemas() {
        let tools = tool_definitions();
        let tools = tools.as_array().unwrap();
        assert_eq!(tools.len(), 6);
        for tool in tools {
            assert_eq!(tool["inputSchema"]["type"], "object");
            assert!(TOOL_NAMES.contains(&tool["name"].as_str().unwrap()));
        }
        assert_eq!(tools[4]["inputSchema"]["properties"]["days"]["default"], 10);
    }

    #[test]
    fn test_signal_text() {
        let text = signal_text(&sample_index());
        assert!(text.starts_with("Trading Signal: SELL\n"));
        assert!(text.contains("Score: 72.3 (greed)"));
        assert!(text.contains("Analysis: Greed in the market."));
        assert!(text.ends_with(DISCLAIMER));
    }

    #[test]
    fn test_comparison_text() {
        let text = comparison_text(&sample_index());
        assert!(text.contains("Current Score: 72.3"));
        assert!(text.contains("Previous Close: 70.1 (change: +2.2)"));
        assert!(text.contains("1 Year Ago: 80.0 (change: -7.7)"));
    }

    #[test]
    fn test_history_text_newest_first() {
        let text = history_text(&sample_index(), 2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Fear & Greed History (Last 2 Days)");
        assert_eq!(lines[2], "2024-01-06: 72.3 (greed)");
        assert_eq!(lines[3], "2024-01-05: 30.0 (fear)");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_score_and_indicator_text() {
        let index = sample_index();
        let score = score_text(&index);
        assert!(score.contains("Score: 72.3/100"));
        assert!(score.contains("Timestamp: 2024-01-05 23:59:57"));
        let indicators = indicators_text(&index);
        assert_eq!(indicators.lines().count(), 9);
        assert!(indicators.contains("Junk Bond Demand: 10.0 (neutral)"));
    }

    #[tokio::test]
    async fn test_protocol_round() {
        let upstream = healthy_upstream().await;
        let server = McpServer::new(client_for(&upstream));

        let init = server
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
            .await
            .unwrap();
        assert_eq!(init["result"]["serverInfo"]["name"], SERVER_NAME);

        assert!(server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .is_none());

        let list = server
            .handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
            .await
            .unwrap();
        assert_eq!(list["result"]["tools"].as_array().unwrap().len(), 6);

        let call = server
            .handle_line(r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"get_fear_greed_history","arguments":{"days":1}}}"#)
            .await
            .unwrap();
        assert_eq!(call["id"], 3);
        assert_eq!(call["result"]["isError"], false);
        let text = call["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.ends_with("2024-01-06: 72.3 (greed)"));
    }

    #[tokio::test]
    async fn test_errors() {
        let upstream = upstream_with(ResponseTemplate::new(503)).await;
        let server = McpServer::new(client_for(&upstream));

        let parse = server.handle_line("{not json").await.unwrap();
        assert_eq!(parse["error"]["code"], PARSE_ERROR);
        assert_eq!(parse["id"], Value::Null);

        let unknown = server
            .handle_line(r#"{"jsonrpc":"2.0","id":"a","method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(unknown["error"]["code"], METHOD_NOT_FOUND);
        assert_eq!(unknown["id"], "a");

        let failed = server.call_tool("get_trading_signal", &json!({})).await;
        assert!(failed.is_error);
        assert!(failed.text.starts_with("Failed to fetch"));

        let bogus = server.call_tool("get_weather", &json!({})).await;
        assert_eq!(bogus.text, "Unknown tool: get_weather");
    }

    #[tokio::test]
    async fn test_run_writes_one_frame_per_request() {
        let upstream = healthy_upstream().await;
        let server = McpServer::new(client_for(&upstream));
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#, "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#, "\n",
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"get_complete_report"}}"#, "\n",
        );
        let mut output: Vec<u8> = Vec::new();
        server.run(input.as_bytes(), &mut output).await.unwrap();

        let frames: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0]["result"], json!({}));
        let report = frames[1]["result"]["content"][0]["text"].as_str().unwrap();
        assert!(report.starts_with("Fear & Greed Now: 72.3 (Greed)"));
    }
}
