//! XML parsing and encoding for the reconstruction configuration
//!
//! The canonical form nests child elements (`<reader><dll>..</dll>
//! <classname>..</classname><port>..</port></reader>`); the parser also
//! accepts the attribute shorthand some clients send
//! (`<reader port="7" class="FooReader"/>`). Unknown elements are
//! skipped so configurations from newer clients still load.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::{Reader as XmlReader, Writer as XmlWriter};

use crate::{Config, ConfigError, GadgetConfig, PluginConfig, Result, StreamConfig};

#[derive(Default)]
struct PluginDraft {
    dll: String,
    classname: Option<String>,
    port: Option<u16>,
}

#[derive(Default)]
struct GadgetDraft {
    name: Option<String>,
    dll: String,
    classname: Option<String>,
    properties: Vec<(String, String)>,
    property_name: Option<String>,
    property_value: Option<String>,
}

impl PluginDraft {
    fn from_attributes(element: &BytesStart<'_>) -> Result<Self> {
        let mut draft = Self::default();
        for (key, value) in attributes(element)? {
            match key.as_str() {
                "dll" => draft.dll = value,
                "classname" | "class" => draft.classname = Some(value),
                "port" | "slot" => draft.port = Some(parse_port(&value)?),
                _ => {}
            }
        }
        Ok(draft)
    }

    fn apply_leaf(&mut self, leaf: &str, text: &str) -> Result<()> {
        match leaf {
            "dll" => self.dll = text.to_owned(),
            "classname" | "class" => self.classname = Some(text.to_owned()),
            "port" | "slot" => self.port = Some(parse_port(text)?),
            _ => {}
        }
        Ok(())
    }

    fn finish(self, component: &'static str) -> Result<PluginConfig> {
        Ok(PluginConfig {
            dll: self.dll,
            classname: self
                .classname
                .ok_or(ConfigError::missing(component, "classname"))?,
            port: self.port,
        })
    }
}

impl GadgetDraft {
    fn from_attributes(element: &BytesStart<'_>) -> Result<Self> {
        let mut draft = Self::default();
        for (key, value) in attributes(element)? {
            match key.as_str() {
                "name" => draft.name = Some(value),
                "dll" => draft.dll = value,
                "classname" | "class" => draft.classname = Some(value),
                _ => {}
            }
        }
        Ok(draft)
    }

    fn apply_leaf(&mut self, leaf: &str, text: &str) {
        match leaf {
            "name" => self.name = Some(text.to_owned()),
            "dll" => self.dll = text.to_owned(),
            "classname" | "class" => self.classname = Some(text.to_owned()),
            _ => {}
        }
    }

    fn finish(self) -> Result<GadgetConfig> {
        Ok(GadgetConfig {
            name: self.name.ok_or(ConfigError::missing("gadget", "name"))?,
            dll: self.dll,
            classname: self
                .classname
                .ok_or(ConfigError::missing("gadget", "classname"))?,
            properties: self.properties,
        })
    }
}

/// Parse a configuration document
pub(crate) fn parse(text: &str) -> Result<Config> {
    let mut reader = XmlReader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut config = Config::default();

    let mut saw_root = false;
    let mut skip_depth = 0usize;
    let mut current_reader: Option<PluginDraft> = None;
    let mut current_writer: Option<PluginDraft> = None;
    let mut in_stream = false;
    let mut current_gadget: Option<GadgetDraft> = None;
    let mut in_property = false;
    let mut current_leaf: Option<String> = None;
    let mut text_buf = String::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        match event {
            Event::Eof => {
                if skip_depth > 0
                    || current_reader.is_some()
                    || current_writer.is_some()
                    || current_gadget.is_some()
                    || in_stream
                    || in_property
                    || current_leaf.is_some()
                {
                    return Err(ConfigError::Parse("unexpected end of document".into()));
                }
                break;
            }

            Event::Start(e) => {
                if skip_depth > 0 {
                    skip_depth += 1;
                    continue;
                }
                let name = element_name(e.name());

                if !saw_root {
                    if name == "configuration" || name == "config" {
                        saw_root = true;
                        continue;
                    }
                    return Err(ConfigError::Parse(format!(
                        "unexpected root element '{name}'"
                    )));
                }

                if in_property {
                    match name.as_str() {
                        "name" | "value" => {
                            current_leaf = Some(name);
                            text_buf.clear();
                        }
                        _ => skip_depth = 1,
                    }
                } else if let Some(_gadget) = current_gadget.as_ref() {
                    match name.as_str() {
                        "name" | "dll" | "classname" | "class" => {
                            current_leaf = Some(name);
                            text_buf.clear();
                        }
                        "property" => in_property = true,
                        _ => skip_depth = 1,
                    }
                } else if current_reader.is_some() || current_writer.is_some() {
                    match name.as_str() {
                        "dll" | "classname" | "class" | "port" | "slot" => {
                            current_leaf = Some(name);
                            text_buf.clear();
                        }
                        _ => skip_depth = 1,
                    }
                } else if in_stream {
                    match name.as_str() {
                        "gadget" => current_gadget = Some(GadgetDraft::from_attributes(&e)?),
                        _ => skip_depth = 1,
                    }
                } else {
                    match name.as_str() {
                        "reader" => current_reader = Some(PluginDraft::from_attributes(&e)?),
                        "writer" => current_writer = Some(PluginDraft::from_attributes(&e)?),
                        "stream" => in_stream = true,
                        _ => skip_depth = 1,
                    }
                }
            }

            Event::Empty(e) => {
                if skip_depth > 0 {
                    continue;
                }
                let name = element_name(e.name());

                if !saw_root {
                    if name == "configuration" || name == "config" {
                        // An empty document is a valid zero-reader config
                        return Ok(config);
                    }
                    return Err(ConfigError::Parse(format!(
                        "unexpected root element '{name}'"
                    )));
                }

                if !in_property && current_gadget.is_some() && name == "property" {
                    if let Some(gadget) = current_gadget.as_mut() {
                        let mut prop_name = None;
                        let mut prop_value = None;
                        for (key, value) in attributes(&e)? {
                            match key.as_str() {
                                "name" => prop_name = Some(value),
                                "value" => prop_value = Some(value),
                                _ => {}
                            }
                        }
                        if let Some(prop_name) = prop_name {
                            gadget
                                .properties
                                .push((prop_name, prop_value.unwrap_or_default()));
                        }
                    }
                } else if in_stream && name == "gadget" {
                    config.stream.gadgets.push(GadgetDraft::from_attributes(&e)?.finish()?);
                } else if !in_stream && current_reader.is_none() && current_writer.is_none() {
                    match name.as_str() {
                        "reader" => config
                            .readers
                            .push(PluginDraft::from_attributes(&e)?.finish("reader")?),
                        "writer" => config
                            .writers
                            .push(PluginDraft::from_attributes(&e)?.finish("writer")?),
                        _ => {}
                    }
                }
            }

            Event::End(e) => {
                if skip_depth > 0 {
                    skip_depth -= 1;
                    continue;
                }
                let name = element_name(e.name());

                if current_leaf.as_deref() == Some(name.as_str()) {
                    current_leaf = None;
                    if in_property {
                        let target = current_gadget
                            .as_mut()
                            .ok_or_else(|| ConfigError::Parse("property outside gadget".into()))?;
                        match name.as_str() {
                            "name" => target.property_name = Some(text_buf.clone()),
                            "value" => target.property_value = Some(text_buf.clone()),
                            _ => {}
                        }
                    } else if let Some(gadget) = current_gadget.as_mut() {
                        gadget.apply_leaf(&name, &text_buf);
                    } else if let Some(draft) = current_reader.as_mut() {
                        draft.apply_leaf(&name, &text_buf)?;
                    } else if let Some(draft) = current_writer.as_mut() {
                        draft.apply_leaf(&name, &text_buf)?;
                    }
                    continue;
                }

                match name.as_str() {
                    "reader" => {
                        if let Some(draft) = current_reader.take() {
                            config.readers.push(draft.finish("reader")?);
                        }
                    }
                    "writer" => {
                        if let Some(draft) = current_writer.take() {
                            config.writers.push(draft.finish("writer")?);
                        }
                    }
                    "stream" => in_stream = false,
                    "gadget" => {
                        if let Some(draft) = current_gadget.take() {
                            config.stream.gadgets.push(draft.finish()?);
                        }
                    }
                    "property" => {
                        in_property = false;
                        if let Some(gadget) = current_gadget.as_mut() {
                            let prop_name = gadget
                                .property_name
                                .take()
                                .ok_or(ConfigError::missing("property", "name"))?;
                            let prop_value = gadget.property_value.take().unwrap_or_default();
                            gadget.properties.push((prop_name, prop_value));
                        }
                    }
                    _ => {}
                }
            }

            Event::Text(e) => {
                if skip_depth == 0 && current_leaf.is_some() {
                    let value = e
                        .unescape()
                        .map_err(|err| ConfigError::Parse(err.to_string()))?;
                    text_buf.push_str(&value);
                }
            }

            _ => {}
        }
    }

    if !saw_root {
        return Err(ConfigError::Parse("empty configuration document".into()));
    }

    Ok(config)
}

/// Encode a configuration in its canonical element form
pub(crate) fn encode(config: &Config) -> String {
    // Writing into an in-memory Vec cannot fail
    write_config(config).expect("in-memory XML write")
}

fn write_config(config: &Config) -> std::io::Result<String> {
    let mut writer = XmlWriter::new(Vec::new());

    writer.write_event(Event::Start(BytesStart::new("configuration")))?;

    for reader in &config.readers {
        write_plugin(&mut writer, "reader", reader)?;
    }
    for w in &config.writers {
        write_plugin(&mut writer, "writer", w)?;
    }
    write_stream(&mut writer, &config.stream)?;

    writer.write_event(Event::End(BytesEnd::new("configuration")))?;

    Ok(String::from_utf8(writer.into_inner()).expect("writer produces UTF-8"))
}

fn write_plugin(
    writer: &mut XmlWriter<Vec<u8>>,
    element: &str,
    plugin: &PluginConfig,
) -> std::io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(element)))?;
    if !plugin.dll.is_empty() {
        write_text_element(writer, "dll", &plugin.dll)?;
    }
    write_text_element(writer, "classname", &plugin.classname)?;
    if let Some(port) = plugin.port {
        write_text_element(writer, "port", &port.to_string())?;
    }
    writer.write_event(Event::End(BytesEnd::new(element)))?;
    Ok(())
}

fn write_stream(writer: &mut XmlWriter<Vec<u8>>, stream: &StreamConfig) -> std::io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new("stream")))?;
    for gadget in &stream.gadgets {
        writer.write_event(Event::Start(BytesStart::new("gadget")))?;
        write_text_element(writer, "name", &gadget.name)?;
        if !gadget.dll.is_empty() {
            write_text_element(writer, "dll", &gadget.dll)?;
        }
        write_text_element(writer, "classname", &gadget.classname)?;
        for (name, value) in &gadget.properties {
            writer.write_event(Event::Start(BytesStart::new("property")))?;
            write_text_element(writer, "name", name)?;
            write_text_element(writer, "value", value)?;
            writer.write_event(Event::End(BytesEnd::new("property")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("gadget")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("stream")))?;
    Ok(())
}

fn write_text_element(
    writer: &mut XmlWriter<Vec<u8>>,
    name: &str,
    value: &str,
) -> std::io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn element_name(name: QName<'_>) -> String {
    String::from_utf8_lossy(name.as_ref()).into_owned()
}

fn attributes(element: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| ConfigError::Parse(e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = String::from_utf8_lossy(attribute.value.as_ref()).into_owned();
        pairs.push((key, value));
    }
    Ok(pairs)
}

fn parse_port(value: &str) -> Result<u16> {
    value
        .parse()
        .map_err(|_| ConfigError::invalid_value("port", value))
}
