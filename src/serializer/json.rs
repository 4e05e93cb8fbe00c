//! JSON 序列化器：嵌套字典形式的直接编解码

use super::Serializer;
use crate::error::QuickModelResult;
use crate::types::{json_value_to_data_value, DataValue};

#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    pretty: bool,
}

impl JsonSerializer {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn pretty(&self) -> bool {
        self.pretty
    }
}

impl Serializer for JsonSerializer {
    fn format(&self) -> &str {
        "json"
    }

    fn serialize(&self, data: &DataValue) -> QuickModelResult<String> {
        let value = data.to_json_value();
        let text = if self.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(text)
    }

    fn deserialize(&self, text: &str) -> QuickModelResult<DataValue> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        Ok(json_value_to_data_value(value))
    }
}
