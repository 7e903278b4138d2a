/// 宿主协议
///
/// 每行一个 JSON 编码的 `EditOperation`，每行回一个 JSON 编码的 `HostResponse`。
/// 开始时先输出一次当前网格。无法解析的行只产生一条错误响应，不会中断循环。

use std::io::{BufRead, Write};

use super::operation::{EditOperation, HostResponse};
use super::session::ResourceSession;
use crate::utils::Result;

/// 处理一行宿主消息
pub fn handle_message(session: &mut ResourceSession, line: &str) -> HostResponse {
    let operation = match serde_json::from_str::<EditOperation>(line) {
        Ok(operation) => operation,
        Err(e) => {
            tracing::warn!("无法解析宿主消息: {}", e);
            return HostResponse::Error {
                message: format!("无效的操作: {}", e),
            };
        }
    };

    let is_mutation = operation.is_mutation();
    let response = HostResponse::from_result(session.apply(operation));
    if is_mutation {
        if let Some(record) = session.history().peek_undo() {
            tracing::debug!("{} | {}", record, session.history().summary());
        }
    }
    response
}

/// 运行宿主循环，直到输入结束
pub fn serve<R: BufRead, W: Write>(session: &mut ResourceSession, input: R, mut output: W) -> Result<()> {
    write_response(&mut output, &HostResponse::View(session.view()))?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_message(session, &line);
        write_response(&mut output, &response)?;
    }

    Ok(())
}

fn write_response<W: Write>(output: &mut W, response: &HostResponse) -> Result<()> {
    serde_json::to_writer(&mut *output, response)?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}
