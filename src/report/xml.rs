// XML encoding of a Snapshot in the collector's schema.
// Element order, empty-element form and number formatting are part of the wire contract.

use super::ReportError;
use crate::models::{Snapshot, SystemData};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use std::borrow::Cow;

struct XmlOut {
    w: Writer<Vec<u8>>,
}

impl XmlOut {
    fn start(&mut self, name: &str) -> Result<(), ReportError> {
        self.w
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(|e| ReportError::Xml(e.to_string()))
    }

    fn end(&mut self, name: &str) -> Result<(), ReportError> {
        self.w
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(|e| ReportError::Xml(e.to_string()))
    }

    fn text(&mut self, value: &str) -> Result<(), ReportError> {
        self.w
            .write_event(Event::Text(BytesText::from_escaped(escape_text(value))))
            .map_err(|e| ReportError::Xml(e.to_string()))
    }

    /// `<name>value</name>`, also when value is empty.
    fn leaf(&mut self, name: &str, value: &str) -> Result<(), ReportError> {
        self.start(name)?;
        self.text(value)?;
        self.end(name)
    }
}

/// Encode without whitespace between elements (the delivered payload).
pub fn to_xml(snapshot: &Snapshot) -> Result<String, ReportError> {
    encode(snapshot, Writer::new(Vec::new()))
}

/// Encode indented with tabs, for debug output.
pub fn to_xml_pretty(snapshot: &Snapshot) -> Result<String, ReportError> {
    encode(snapshot, Writer::new_with_indent(Vec::new(), b'\t', 1))
}

fn encode(snapshot: &Snapshot, w: Writer<Vec<u8>>) -> Result<String, ReportError> {
    let mut out = XmlOut { w };
    out.start("data")?;
    write_system_data(&mut out, &snapshot.system_data)?;

    out.start("interface_data")?;
    for iface in &snapshot.interfaces {
        out.start(&iface.name)?;
        out.leaf("name", &iface.name)?;
        out.leaf("mtu", &iface.mtu.to_string())?;
        out.leaf("mac_addr", &iface.mac_addr)?;
        out.leaf("traffic_rx", &iface.traffic_rx.to_string())?;
        out.leaf("traffic_tx", &iface.traffic_tx.to_string())?;
        out.end(&iface.name)?;
    }
    out.end("interface_data")?;

    out.leaf("batman_adv_interfaces", &snapshot.batman_adv_interfaces)?;
    out.leaf("batman_adv_originators", &snapshot.batman_adv_originators)?;
    out.leaf("batman_adv_gateway_mode", &snapshot.batman_adv_gateway_mode)?;
    out.leaf("batman_adv_gateway_list", &snapshot.batman_adv_gateway_list)?;

    out.start("babel_neighbours")?;
    for n in &snapshot.babel_neighbours {
        out.start("neighbour")?;
        out.text(&n.mac_addr)?;
        out.leaf("outgoing_interface", &n.outgoing_interface)?;
        out.end("neighbour")?;
    }
    out.end("babel_neighbours")?;

    out.leaf("client_count", &snapshot.client_count.to_string())?;
    out.start("clients")?;
    for c in &snapshot.clients {
        out.leaf(&c.interface, &c.count.to_string())?;
    }
    out.end("clients")?;
    out.end("data")?;

    String::from_utf8(out.w.into_inner()).map_err(|e| ReportError::Xml(e.to_string()))
}

fn write_system_data(out: &mut XmlOut, sd: &SystemData) -> Result<(), ReportError> {
    out.start("system_data")?;
    out.leaf("status", &sd.status)?;
    out.leaf("hostname", &sd.hostname)?;
    out.leaf("description", &sd.description)?;
    out.start("geo")?;
    out.leaf("lat", &format_float(sd.geo.lat))?;
    out.leaf("lng", &format_float(sd.geo.lng))?;
    out.end("geo")?;
    out.leaf("position_comment", &sd.position_comment)?;
    out.leaf("contact", &sd.contact)?;
    out.leaf("hood", &sd.hood)?;
    out.leaf("hoodid", &sd.hoodid)?;
    out.leaf("distname", &sd.distname)?;
    out.leaf("distversion", &sd.distversion)?;
    out.leaf("chipset", &sd.chipset)?;
    for cpu in &sd.cpu {
        out.leaf("cpu", cpu)?;
    }
    out.leaf("model", &sd.model)?;
    out.leaf("memory_total", &sd.memory_total.to_string())?;
    out.leaf("memory_free", &sd.memory_free.to_string())?;
    out.leaf("memory_buffering", &sd.memory_buffering.to_string())?;
    out.leaf("memory_caching", &sd.memory_caching.to_string())?;
    out.leaf("loadavg", &format_float(sd.loadavg))?;
    out.leaf("processes", &sd.processes)?;
    out.leaf("uptime", &sd.uptime.to_string())?;
    out.leaf("idletime", &format_float(sd.idletime))?;
    out.leaf("local_time", &sd.local_time.to_string())?;
    out.leaf("batman_advanced_version", &sd.batman_advanced_version)?;
    out.leaf("kernel_version", &sd.kernel_version)?;
    out.leaf("nodewatcher_version", &sd.nodewatcher_version)?;
    out.leaf("firmware_version", &sd.firmware_version)?;
    out.leaf("firmware_revision", &sd.firmware_revision)?;
    out.leaf("openwrt_core_revision", &sd.openwrt_core_revision)?;
    out.leaf(
        "openwrt_feeds_packages_revision",
        &sd.openwrt_feeds_packages_revision,
    )?;
    out.leaf("vpn_active", &sd.vpn_active.to_string())?;
    out.end("system_data")
}

/// Shortest round-trip digits; exponent form (`1.5e+06`) when the exponent is < -4 or >= 6.
pub(crate) fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "NaN".into();
    }
    if v.is_infinite() {
        return if v > 0.0 { "+Inf" } else { "-Inf" }.into();
    }
    let sci = format!("{v:e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return format!("{v}");
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    if (-4..6).contains(&exp) {
        format!("{v}")
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.abs())
    }
}

/// Character data escaping; quotes and whitespace controls use numeric references.
pub(crate) fn escape_text(s: &str) -> Cow<'_, str> {
    let needs = |c: char| {
        matches!(c, '"' | '\'' | '&' | '<' | '>' | '\t' | '\n' | '\r') || !is_xml_char(c)
    };
    if !s.chars().any(needs) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            c if !is_xml_char(c) => out.push('\u{FFFD}'),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{09}' | '\u{0A}' | '\u{0D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}
