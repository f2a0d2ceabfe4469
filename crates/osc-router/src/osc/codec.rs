//! OSC 1.0 消息编解码
//!
//! 消息格式：[地址字符串][类型标签字符串][参数]
//! 字符串：UTF-8 + NUL 结尾，按 4 字节对齐补 NUL
//! blob：4 字节大端长度 + 数据，按 4 字节对齐补 NUL
//!
//! 路由器只发送单参数消息：string 格式为 `s`，binary 格式为 `b`。

use std::fmt;
use std::str::FromStr;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, RouterError};

/// OSC 对齐单位
pub const OSC_ALIGN: usize = 4;

/// 类型标签：字符串参数
pub const TAG_STRING: u8 = b's';

/// 类型标签：blob 参数
pub const TAG_BLOB: u8 = b'b';

// ========== 消息格式 ==========

/// 负载编码方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageFormat {
    /// JSON 字节作为 blob 参数
    Binary,
    /// JSON 文本作为字符串参数
    #[default]
    String,
}

impl MessageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::String => "string",
        }
    }
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageFormat {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" => Ok(Self::Binary),
            "string" => Ok(Self::String),
            other => Err(RouterError::InvalidFormat(other.to_string())),
        }
    }
}

// ========== 负载 ==========

/// OSC 消息的单个参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OscPayload {
    Text(String),
    Blob(Bytes),
}

impl OscPayload {
    /// 按格式将 JSON 值编码为负载
    pub fn from_json(value: &Value, format: MessageFormat) -> Result<Self> {
        Ok(match format {
            MessageFormat::String => Self::Text(serde_json::to_string(value)?),
            MessageFormat::Binary => Self::Blob(Bytes::from(serde_json::to_vec(value)?)),
        })
    }

    pub fn type_tag(&self) -> u8 {
        match self {
            Self::Text(_) => TAG_STRING,
            Self::Blob(_) => TAG_BLOB,
        }
    }

    /// 日志用的负载预览，按字符截断
    pub fn preview(&self, max_chars: usize) -> String {
        let text = match self {
            Self::Text(s) => s.clone(),
            Self::Blob(b) => String::from_utf8_lossy(b).into_owned(),
        };
        if text.chars().count() <= max_chars {
            text
        } else {
            let mut truncated: String = text.chars().take(max_chars).collect();
            truncated.push_str("...");
            truncated
        }
    }

    /// 解析回 JSON 值
    pub fn to_json(&self) -> Result<Value> {
        Ok(match self {
            Self::Text(s) => serde_json::from_str(s)?,
            Self::Blob(b) => serde_json::from_slice(b)?,
        })
    }
}

// ========== 编码 ==========

/// 补齐到 4 字节边界所需的字节数
#[inline]
pub fn padding(len: usize) -> usize {
    (OSC_ALIGN - len % OSC_ALIGN) % OSC_ALIGN
}

/// 写入 NUL 结尾并对齐的 OSC 字符串
fn put_osc_string(buf: &mut BytesMut, s: &str) {
    buf.put_slice(s.as_bytes());
    let len = s.len() + 1;
    buf.put_bytes(0, 1 + padding(len));
}

/// 写入带长度前缀并对齐的 OSC blob
fn put_osc_blob(buf: &mut BytesMut, data: &[u8]) -> Result<()> {
    let len = u32::try_from(data.len())
        .map_err(|_| RouterError::Encode(format!("blob 过大: {} 字节", data.len())))?;
    buf.put_u32(len);
    buf.put_slice(data);
    buf.put_bytes(0, padding(data.len()));
    Ok(())
}

/// 校验 OSC 地址：以 `/` 开头，且不含 NUL
pub fn validate_address(address: &str) -> Result<()> {
    if !address.starts_with('/') || address.contains('\0') {
        return Err(RouterError::InvalidEndpoint(address.to_string()));
    }
    Ok(())
}

/// 编码单参数 OSC 消息
pub fn encode_message(address: &str, payload: &OscPayload) -> Result<Bytes> {
    validate_address(address)?;

    let mut buf = BytesMut::with_capacity(64);
    put_osc_string(&mut buf, address);
    // 类型标签 ",x" 加 NUL 恰好补齐为一个 4 字节字
    buf.put_slice(&[b',', payload.type_tag(), 0, 0]);

    match payload {
        OscPayload::Text(text) => {
            if text.contains('\0') {
                return Err(RouterError::Encode("字符串参数包含 NUL".to_string()));
            }
            put_osc_string(&mut buf, text);
        }
        OscPayload::Blob(data) => put_osc_blob(&mut buf, data)?,
    }

    Ok(buf.freeze())
}

// ========== 解码 ==========

/// 读取 NUL 结尾并对齐的 OSC 字符串
fn read_osc_string(buf: &mut Bytes) -> Result<String> {
    let end = buf
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| RouterError::Decode("字符串缺少 NUL 结尾".to_string()))?;
    let total = end + 1 + padding(end + 1);
    if buf.remaining() < total {
        return Err(RouterError::Decode("字符串未按 4 字节对齐".to_string()));
    }
    let raw = buf.split_to(end);
    buf.advance(total - end);
    String::from_utf8(raw.to_vec()).map_err(|e| RouterError::Decode(e.to_string()))
}

/// 解码单参数 OSC 消息，返回 (地址, 负载)
pub fn decode_message(packet: &[u8]) -> Result<(String, OscPayload)> {
    let mut buf = Bytes::copy_from_slice(packet);
    let address = read_osc_string(&mut buf)?;
    let tags = read_osc_string(&mut buf)?;

    let payload = match tags.as_bytes() {
        [b',', TAG_STRING] => OscPayload::Text(read_osc_string(&mut buf)?),
        [b',', TAG_BLOB] => {
            if buf.remaining() < 4 {
                return Err(RouterError::Decode("blob 缺少长度前缀".to_string()));
            }
            let len = buf.get_u32() as usize;
            if buf.remaining() < len + padding(len) {
                return Err(RouterError::Decode("blob 数据不完整".to_string()));
            }
            let data = buf.split_to(len);
            buf.advance(padding(len));
            OscPayload::Blob(data)
        }
        _ => return Err(RouterError::Decode(format!("不支持的类型标签: {}", tags))),
    };

    Ok((address, payload))
}
