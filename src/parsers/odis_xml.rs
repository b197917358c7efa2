//! ODIS protocol XML loader.
//!
//! Deserializes the tester's XML export with `quick-xml` into private mirror
//! structs, then converts them into the [`crate::model`] tree, wiring up the
//! key projections of every keyed collection on the way.

use super::ParseError;
use crate::model::{
    subsystem_key, Communication, Ecu, EcuData, EcuGroup, Information, KeyedSequence, NameValue,
    OdisProtocol, ValueItem, Vehicle,
};
use serde::Deserialize;

/// Parser for ODIS protocol XML documents
#[derive(Debug, Clone, Copy, Default)]
pub struct OdisXmlParser;

impl OdisXmlParser {
    /// Create a new ODIS XML parser
    pub const fn new() -> Self {
        Self
    }

    /// Quick check whether the content looks like an ODIS protocol.
    pub fn can_parse(&self, content: &str) -> bool {
        let head: String = content.chars().take(4096).collect();
        head.contains("<protocol")
    }

    /// Parse an ODIS protocol from XML text
    pub fn parse_str(&self, content: &str) -> Result<OdisProtocol, ParseError> {
        if !self.can_parse(content) {
            return Err(ParseError::InvalidStructure(
                "expected a <protocol> root element".to_string(),
            ));
        }

        let xml: ProtocolXml =
            quick_xml::de::from_str(content).map_err(|e| ParseError::XmlError(e.to_string()))?;

        convert_protocol(xml)
    }
}

// =============================================================================
// Conversion into the model
// =============================================================================

/// Exact empty strings carry no information; treat them as absent.
fn text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn convert_protocol(xml: ProtocolXml) -> Result<OdisProtocol, ParseError> {
    let vehicle = match xml.vehicle {
        Some(vehicle) => convert_vehicle(vehicle)?,
        None => {
            tracing::warn!("ODIS protocol has no <vehicle> section");
            Vehicle::default()
        }
    };

    Ok(OdisProtocol {
        time_of_issue: text(xml.time_of_issue),
        charset: text(xml.charset),
        information: xml.information.map(|info| Information {
            document_name: text(info.document_name),
            software_name: text(info.software_name),
            pc_name: text(info.pc_name),
            diag_hardware: text(info.diag_hardware),
            version: info.version.and_then(|v| text(v.number)),
        }),
        vehicle,
    })
}

fn convert_vehicle(xml: VehicleXml) -> Result<Vehicle, ParseError> {
    let name_values = |items: Vec<NameValueXml>| -> Vec<NameValue> {
        items
            .into_iter()
            .map(|nv| NameValue {
                display_name: text(nv.display_name),
                display_value: text(nv.display_value),
            })
            .collect()
    };

    let mut ecu_ordinal = 0usize;
    let mut communications = Vec::with_capacity(xml.communications.len());
    for comm in xml.communications {
        let mut ecu_groups = Vec::with_capacity(comm.ecus.len());
        for group in comm.ecus {
            let mut ecus = Vec::with_capacity(group.ecu.len());
            for ecu in group.ecu {
                ecu_ordinal += 1;
                ecus.push(convert_ecu(ecu, ecu_ordinal)?);
            }
            ecu_groups.push(EcuGroup {
                group_type: text(group.group_type),
                ecus,
            });
        }
        communications.push(Communication {
            comm_type: text(comm.comm_type),
            ecu_groups,
        });
    }

    Ok(Vehicle {
        vehicle_data: name_values(xml.vehicle_data),
        odx_info: name_values(xml.odx_info),
        communications,
    })
}

fn convert_ecu(xml: EcuXml, ordinal: usize) -> Result<Ecu, ParseError> {
    let ecu_id = text(xml.ecu_id)
        .ok_or_else(|| ParseError::MissingField(format!("ecu_id in ECU #{ordinal}")))?;

    let masters = KeyedSequence::new(xml.ecu_master.into_iter().map(convert_record).collect());

    let subsystem_records: Vec<EcuData> = xml
        .ecu_subsystem
        .map(|s| s.subsystem.into_iter().map(convert_record).collect())
        .unwrap_or_default();
    for record in &subsystem_records {
        if record.subsystem_qualifier().is_empty() {
            tracing::warn!(
                "Subsystem record of type '{}' in ECU {} has no identity; keyed by type only",
                record.record_type,
                ecu_id
            );
        }
    }

    Ok(Ecu {
        time_stamp: text(xml.time_stamp),
        ecu_id,
        ecu_name: text(xml.ecu_name),
        logical_link: text(xml.logicallink),
        tester_odx_variant: text(xml.tester_odx_variant),
        masters,
        subsystems: KeyedSequence::with_projection(subsystem_records, subsystem_key),
    })
}

fn convert_record(xml: EcuDataXml) -> EcuData {
    EcuData {
        record_type: xml.record_type.unwrap_or_default(),
        time_stamp: text(xml.time_stamp),
        display_name: text(xml.display_name),
        ti_name: text(xml.ti_name),
        values: KeyedSequence::new(xml.values.into_iter().map(convert_value).collect()),
    }
}

// Builds bottom-up with an explicit stack. This does not bound nesting
// depth: quick-xml has already recursed once per level while deserializing
// `ValueXml`, so the deserializer's recursion is the effective limit.
fn convert_value(root: ValueXml) -> ValueItem {
    struct Pending {
        item: ValueItem,
        children: std::vec::IntoIter<ValueXml>,
        converted: Vec<ValueItem>,
    }

    let split = |xml: ValueXml| -> Pending {
        Pending {
            item: ValueItem {
                ti_name: text(xml.ti_name),
                display_name: text(xml.display_name),
                display_value: text(xml.display_value),
                bin_value: text(xml.bin_value),
                hex_value: text(xml.hex_value),
                ti_value: text(xml.ti_value),
                ti_unit: text(xml.ti_unit),
                display_unit: text(xml.display_unit),
                sub_values: KeyedSequence::default(),
            },
            children: xml.values.into_iter(),
            converted: Vec::new(),
        }
    };

    let mut stack = vec![split(root)];
    loop {
        let next_child = stack.last_mut().and_then(|top| top.children.next());
        if let Some(child) = next_child {
            stack.push(split(child));
            continue;
        }

        let Some(mut done) = stack.pop() else {
            return ValueItem::default();
        };
        done.item.sub_values = KeyedSequence::new(done.converted);
        match stack.last_mut() {
            Some(parent) => parent.converted.push(done.item),
            None => return done.item,
        }
    }
}

// =============================================================================
// ODIS XML structures for deserialization
// =============================================================================

/// Root `protocol` element
#[derive(Debug, Deserialize)]
#[serde(rename = "protocol")]
struct ProtocolXml {
    time_of_issue: Option<String>,
    charset: Option<String>,
    information: Option<InformationXml>,
    vehicle: Option<VehicleXml>,
}

#[derive(Debug, Deserialize)]
struct InformationXml {
    document_name: Option<String>,
    software_name: Option<String>,
    pc_name: Option<String>,
    diag_hardware: Option<String>,
    version: Option<VersionXml>,
}

#[derive(Debug, Deserialize)]
struct VersionXml {
    number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VehicleXml {
    #[serde(default)]
    vehicle_data: Vec<NameValueXml>,
    #[serde(default)]
    odx_info: Vec<NameValueXml>,
    #[serde(default)]
    communications: Vec<CommunicationXml>,
}

#[derive(Debug, Deserialize)]
struct NameValueXml {
    display_name: Option<String>,
    display_value: Option<String>,
}

/// `communications` element (one per bus / channel)
#[derive(Debug, Deserialize)]
struct CommunicationXml {
    #[serde(rename = "@type")]
    comm_type: Option<String>,
    #[serde(default)]
    ecus: Vec<EcuGroupXml>,
}

/// `ecus` wrapper element
#[derive(Debug, Deserialize)]
struct EcuGroupXml {
    #[serde(rename = "@type")]
    group_type: Option<String>,
    #[serde(default)]
    ecu: Vec<EcuXml>,
}

#[derive(Debug, Deserialize)]
struct EcuXml {
    time_stamp: Option<String>,
    ecu_id: Option<String>,
    ecu_name: Option<String>,
    logicallink: Option<String>,
    tester_odx_variant: Option<String>,
    #[serde(default)]
    ecu_master: Vec<EcuDataXml>,
    ecu_subsystem: Option<SubsystemsXml>,
}

/// `ecu_subsystem` wrapper element
#[derive(Debug, Deserialize)]
struct SubsystemsXml {
    #[serde(default)]
    subsystem: Vec<EcuDataXml>,
}

/// `ecu_master` / `subsystem` element
#[derive(Debug, Deserialize)]
struct EcuDataXml {
    #[serde(rename = "@type")]
    record_type: Option<String>,
    time_stamp: Option<String>,
    display_name: Option<String>,
    ti_name: Option<String>,
    #[serde(default)]
    values: Vec<ValueXml>,
}

/// `values` element, recursive
#[derive(Debug, Deserialize)]
struct ValueXml {
    ti_name: Option<String>,
    display_name: Option<String>,
    display_value: Option<String>,
    bin_value: Option<String>,
    hex_value: Option<String>,
    ti_value: Option<String>,
    ti_unit: Option<String>,
    display_unit: Option<String>,
    #[serde(default)]
    values: Vec<ValueXml>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EcuSelector;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<protocol>
  <time_of_issue>2024-03-01T10:00:00</time_of_issue>
  <charset>UTF-8</charset>
  <information>
    <document_name>Diagnostic protocol</document_name>
    <version><number>23.0.1</number></version>
  </information>
  <vehicle>
    <vehicle_data><display_name>vin</display_name><display_value>WVWZZZ1KZAW000001</display_value></vehicle_data>
    <vehicle_data><display_name>mileage</display_name><display_value>120345 km</display_value></vehicle_data>
    <communications type="DoIP">
      <ecus type="installed">
        <ecu>
          <time_stamp>2024-03-01T10:01:00</time_stamp>
          <ecu_id>0019</ecu_id>
          <ecu_name>Gateway</ecu_name>
          <logicallink>EV_Gateway</logicallink>
          <tester_odx_variant>EV_Gateway_001</tester_odx_variant>
          <ecu_master type="ident">
            <display_name>Identification</display_name>
            <values>
              <ti_name>SFT0004B</ti_name>
              <display_name>Slot</display_name>
              <display_value>A</display_value>
            </values>
            <values>
              <ti_name>SFT0004B</ti_name>
              <display_name>Slot</display_name>
              <display_value>B</display_value>
              <values>
                <display_name>Nested</display_name>
                <hex_value>0x01</hex_value>
              </values>
            </values>
          </ecu_master>
          <ecu_master type="coding_read">
            <values><ti_name>COD001</ti_name><bin_value>0101</bin_value></values>
          </ecu_master>
          <ecu_subsystem>
            <subsystem type="ident">
              <values><ti_name>MAS01171</ti_name><display_value>1</display_value></values>
              <values><ti_name>IDE00013</ti_name><display_value>5Q0959</display_value></values>
            </subsystem>
          </ecu_subsystem>
        </ecu>
      </ecus>
    </communications>
  </vehicle>
</protocol>"#;

    #[test]
    fn test_parse_sample_protocol() {
        let protocol = OdisXmlParser::new().parse_str(SAMPLE).unwrap();
        assert_eq!(protocol.vin(), Some("WVWZZZ1KZAW000001"));
        assert_eq!(protocol.mileage(), Some("120345 km"));
        assert_eq!(
            protocol.information.as_ref().and_then(|i| i.version.as_deref()),
            Some("23.0.1")
        );

        let ecus = protocol.ecus(&EcuSelector::default());
        let gateway = &ecus["0019"];
        assert_eq!(gateway.ecu_name.as_deref(), Some("Gateway"));
        assert_eq!(gateway.logical_link.as_deref(), Some("EV_Gateway"));

        let master_keys: Vec<&str> = gateway.masters.keys().collect();
        assert_eq!(master_keys, ["ident", "coding_read"]);

        let ident = gateway.masters.get("ident").unwrap();
        let value_keys: Vec<&str> = ident.values.keys().collect();
        assert_eq!(value_keys, ["SFT0004B", "SFT0004B_2"]);

        let second_slot = ident.values.get("SFT0004B_2").unwrap();
        assert_eq!(second_slot.display_value.as_deref(), Some("B"));
        assert_eq!(second_slot.sub_values.len(), 1);
        assert!(second_slot.sub_values.contains_key("Nested"));

        let subsystem_keys: Vec<&str> = gateway.subsystems.keys().collect();
        assert_eq!(subsystem_keys, ["1_ident"]);
    }

    #[test]
    fn test_rejects_non_protocol_document() {
        let err = OdisXmlParser::new()
            .parse_str("<bom><components/></bom>")
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidStructure(_)));
    }

    #[test]
    fn test_missing_ecu_id_is_reported() {
        let xml = r#"<protocol><vehicle><communications type="x"><ecus type="y">
            <ecu><ecu_name>Nameless</ecu_name></ecu>
        </ecus></communications></vehicle></protocol>"#;
        let err = OdisXmlParser::new().parse_str(xml).unwrap_err();
        assert!(matches!(err, ParseError::MissingField(ref f) if f.contains("ecu_id")));
    }

    #[test]
    fn test_deeply_nested_values() {
        let depth = 64;
        let mut xml = String::from(
            "<protocol><vehicle><communications><ecus><ecu><ecu_id>01</ecu_id><ecu_master type=\"ident\">",
        );
        for i in 0..depth {
            xml.push_str(&format!("<values><ti_name>V{i}</ti_name>"));
        }
        for _ in 0..depth {
            xml.push_str("</values>");
        }
        xml.push_str("</ecu_master></ecu></ecus></communications></vehicle></protocol>");

        let protocol = OdisXmlParser::new().parse_str(&xml).unwrap();
        let ecus = protocol.ecus(&EcuSelector::default());
        let mut node = ecus["01"].masters.get("ident").unwrap().values.get("V0");
        let mut seen = 0;
        while let Some(item) = node {
            seen += 1;
            node = item.sub_values.iter().next();
        }
        assert_eq!(seen, depth);
    }

    #[test]
    fn test_nested_values_keep_sibling_order() {
        let xml = r#"<protocol><vehicle><communications><ecus><ecu><ecu_id>01</ecu_id>
            <ecu_master type="coding_read">
              <values><ti_name>ROOT</ti_name>
                <values><ti_name>A</ti_name>
                  <values><ti_name>A1</ti_name></values>
                  <values><ti_name>A2</ti_name></values>
                </values>
                <values><ti_name>B</ti_name></values>
              </values>
            </ecu_master>
        </ecu></ecus></communications></vehicle></protocol>"#;

        let protocol = OdisXmlParser::new().parse_str(xml).unwrap();
        let ecus = protocol.ecus(&EcuSelector::default());
        let root = ecus["01"].masters.get("coding_read").unwrap().values.get("ROOT").unwrap();

        let children: Vec<&str> = root.sub_values.keys().collect();
        assert_eq!(children, ["A", "B"]);
        let grandchildren: Vec<&str> = root.sub_values.get("A").unwrap().sub_values.keys().collect();
        assert_eq!(grandchildren, ["A1", "A2"]);
        assert!(root.sub_values.get("B").unwrap().sub_values.is_empty());
    }
}
