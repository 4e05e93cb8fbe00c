//! XML 序列化器
//!
//! 写出：每层字典的每个键生成一个元素；字典取值生成嵌套元素；
//! 列表取值生成重复的兄弟元素，元素名取列表项自己的单键；空值生成空元素。
//! 同一层的子元素先写非空标量，再写空标量，最后写嵌套取值，组内按键排序。
//!
//! 读取：看第一个子元素是否有文本来判断当前子树是单个对象还是集合。
//! 没有子元素的根元素原样返回输入文本（空集合同样如此）。

use super::Serializer;
use crate::error::QuickModelResult;
use crate::types::DataValue;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashMap;
use std::io::Cursor;

#[derive(Debug, Clone, Default)]
pub struct XmlSerializer {
    declaration: bool,
}

impl XmlSerializer {
    pub fn new(declaration: bool) -> Self {
        Self { declaration }
    }
}

/// 解析后的元素
#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

fn xml_error(e: impl std::fmt::Display) -> crate::error::QuickModelError {
    crate::quick_error!(serialization, format!("XML 处理失败: {}", e))
}

/// 标量的文本形式
fn scalar_text(value: &DataValue) -> String {
    match value {
        DataValue::Null => String::new(),
        DataValue::Bool(true) => "True".to_string(),
        DataValue::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}

fn is_empty_scalar(value: &DataValue) -> bool {
    match value {
        DataValue::Null => true,
        DataValue::String(s) => s.is_empty(),
        _ => false,
    }
}

/// 子元素的写出顺序
fn child_rank(value: &DataValue) -> u8 {
    if !value.is_scalar() {
        2
    } else if is_empty_scalar(value) {
        1
    } else {
        0
    }
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, name: &str, value: &DataValue) -> QuickModelResult<()> {
    let empty = match value {
        DataValue::Object(map) => map.is_empty(),
        DataValue::Array(items) => items.is_empty(),
        scalar => is_empty_scalar(scalar),
    };
    if empty {
        writer.write_event(Event::Empty(BytesStart::new(name))).map_err(xml_error)?;
        return Ok(());
    }

    writer.write_event(Event::Start(BytesStart::new(name))).map_err(xml_error)?;
    match value {
        DataValue::Object(map) => {
            let mut entries: Vec<(&String, &DataValue)> = map.iter().collect();
            entries.sort_by(|(ka, va), (kb, vb)| child_rank(va).cmp(&child_rank(vb)).then(ka.cmp(kb)));
            for (key, child) in entries {
                write_element(writer, key, child)?;
            }
        }
        DataValue::Array(items) => {
            for item in items {
                let map = item.as_object().ok_or_else(|| {
                    crate::quick_error!(
                        type_error,
                        format!("XML 列表项必须是字典，收到 {}", item.type_name())
                    )
                })?;
                let mut entries: Vec<(&String, &DataValue)> = map.iter().collect();
                entries.sort_by(|(ka, _), (kb, _)| ka.cmp(kb));
                for (key, child) in entries {
                    write_element(writer, key, child)?;
                }
            }
        }
        scalar => {
            let text = scalar_text(scalar);
            writer.write_event(Event::Text(BytesText::new(&text))).map_err(xml_error)?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new(name))).map_err(xml_error)?;
    Ok(())
}

fn parse_document(text: &str) -> QuickModelResult<Element> {
    // 文本节点保留原样，标量首尾的空白属于取值
    let mut reader = Reader::from_str(text);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    let element_name = |start: &BytesStart<'_>| String::from_utf8_lossy(start.name().as_ref()).into_owned();

    loop {
        let event = reader.read_event().map_err(xml_error)?;
        let finished = match event {
            Event::Start(start) => {
                stack.push(Element { name: element_name(&start), ..Default::default() });
                None
            }
            Event::Empty(start) => Some(Element { name: element_name(&start), ..Default::default() }),
            Event::End(_) => {
                let mut element = stack.pop().ok_or_else(|| xml_error("多余的结束标签"))?;
                // 子元素之间的缩进不是取值
                if !element.children.is_empty() && element.text.trim().is_empty() {
                    element.text.clear();
                }
                Some(element)
            }
            Event::Text(content) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&content.unescape().map_err(xml_error)?);
                }
                None
            }
            Event::CData(content) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&content.into_inner()));
                }
                None
            }
            Event::Eof => break,
            _ => None,
        };

        if let Some(element) = finished {
            match stack.last_mut() {
                Some(parent) => parent.children.push(element),
                None if root.is_none() => root = Some(element),
                None => return Err(xml_error("存在多个根元素")),
            }
        }
    }

    if !stack.is_empty() {
        return Err(xml_error("元素未闭合"));
    }
    root.ok_or_else(|| xml_error("缺少根元素"))
}

fn element_to_xml(element: &Element) -> QuickModelResult<String> {
    fn write<W: std::io::Write>(writer: &mut Writer<W>, element: &Element) -> QuickModelResult<()> {
        if element.children.is_empty() && element.text.is_empty() {
            writer
                .write_event(Event::Empty(BytesStart::new(element.name.as_str())))
                .map_err(xml_error)?;
            return Ok(());
        }
        writer
            .write_event(Event::Start(BytesStart::new(element.name.as_str())))
            .map_err(xml_error)?;
        if !element.text.is_empty() {
            writer
                .write_event(Event::Text(BytesText::new(&element.text)))
                .map_err(xml_error)?;
        }
        for child in &element.children {
            write(writer, child)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(element.name.as_str())))
            .map_err(xml_error)?;
        Ok(())
    }

    let mut writer = Writer::new(Cursor::new(Vec::new()));
    write(&mut writer, element)?;
    String::from_utf8(writer.into_inner().into_inner()).map_err(xml_error)
}

/// 元素 → 嵌套字典
///
/// `raw` 为该元素的原始文本，没有子元素时原样返回
fn element_to_value(element: &Element, raw: Option<&str>) -> QuickModelResult<DataValue> {
    let Some(first) = element.children.first() else {
        return Ok(DataValue::String(match raw {
            Some(raw) => raw.to_string(),
            None => element_to_xml(element)?,
        }));
    };

    let is_object = !first.text.is_empty();
    let values = if is_object {
        let mut values = HashMap::new();
        for child in &element.children {
            let value = if !child.text.is_empty() {
                DataValue::String(child.text.clone())
            } else if let Some(grandchild) = child.children.first() {
                element_to_value(grandchild, None)?
            } else {
                DataValue::String(String::new())
            };
            values.insert(child.name.clone(), value);
        }
        DataValue::Object(values)
    } else {
        DataValue::Array(
            element
                .children
                .iter()
                .map(|child| element_to_value(child, None))
                .collect::<QuickModelResult<Vec<_>>>()?,
        )
    };

    Ok(DataValue::single(element.name.clone(), values))
}

impl Serializer for XmlSerializer {
    fn format(&self) -> &str {
        "xml"
    }

    fn serialize(&self, data: &DataValue) -> QuickModelResult<String> {
        let (root, body) = data.as_single_entry().ok_or_else(|| {
            crate::quick_error!(
                type_error,
                format!("XML 序列化需要单键字典，收到 {}", data.type_name())
            )
        })?;
        if body.is_scalar() {
            return Err(crate::quick_error!(
                type_error,
                format!("XML 序列化只支持字典和列表，收到 {}", body.type_name())
            ));
        }

        let mut writer = Writer::new(Cursor::new(Vec::new()));
        if self.declaration {
            writer
                .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
                .map_err(xml_error)?;
        }
        write_element(&mut writer, root, body)?;
        String::from_utf8(writer.into_inner().into_inner()).map_err(xml_error)
    }

    fn deserialize(&self, text: &str) -> QuickModelResult<DataValue> {
        let root = parse_document(text)?;
        element_to_value(&root, Some(text))
    }
}
