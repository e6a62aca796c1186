//! End-to-end generation tests: schema in, complete XHTML+XForms
//! document out.

use std::collections::HashSet;

use pretty_assertions::assert_eq;

use schema2xforms::builder::ROOT_GROUP_ID;
use schema2xforms::dom::Element;
use schema2xforms::{remove_prototype_nodes, Error, SchemaModel, XFormsBuilder};

const TNS: &str = "http://example.com/po";

const ORDER_SCHEMA: &str = r#"
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns:po="http://example.com/po"
           targetNamespace="http://example.com/po"
           elementFormDefault="qualified">
  <xs:element name="order" type="po:OrderType"/>
  <xs:complexType name="OrderType">
    <xs:sequence>
      <xs:element name="title" type="xs:string"/>
      <xs:element name="note" type="xs:string" minOccurs="0"/>
      <xs:element name="item" type="po:ItemType" minOccurs="2" maxOccurs="unbounded"/>
      <xs:element name="shipTo" type="po:AddressType"/>
    </xs:sequence>
    <xs:attribute name="orderDate" type="xs:date" use="required"/>
  </xs:complexType>
  <xs:complexType name="ItemType">
    <xs:sequence>
      <xs:element name="sku" type="xs:string"/>
      <xs:element name="quantity" type="xs:int"/>
    </xs:sequence>
  </xs:complexType>
  <xs:complexType name="AddressType" abstract="true">
    <xs:sequence>
      <xs:element name="street" type="xs:string"/>
    </xs:sequence>
  </xs:complexType>
  <xs:complexType name="USAddressType">
    <xs:complexContent>
      <xs:extension base="po:AddressType">
        <xs:sequence>
          <xs:element name="state" type="xs:string"/>
        </xs:sequence>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>
  <xs:complexType name="CanadianAddressType">
    <xs:complexContent>
      <xs:extension base="po:AddressType">
        <xs:sequence>
          <xs:element name="province" type="xs:string"/>
        </xs:sequence>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>
</xs:schema>
"#;

fn generate() -> schema2xforms::XForm {
    let schema = SchemaModel::parse(ORDER_SCHEMA).expect("schema parses");
    XFormsBuilder::new(&schema)
        .build("order", None)
        .expect("form generates")
}

fn model_of(root: &Element) -> &Element {
    root.find(&|e| e.local_name() == "model").expect("model")
}

fn body_of(root: &Element) -> &Element {
    root.find(&|e| e.local_name() == "body").expect("body")
}

fn descendants_named<'a>(root: &'a Element, local: &str) -> Vec<&'a Element> {
    root.descendants()
        .filter(|e| e.local_name() == local)
        .collect()
}

fn label_text(el: &Element) -> Option<String> {
    el.child_elements()
        .find(|c| c.local_name() == "label")
        .map(|l| l.text())
}

#[test]
fn document_shape_and_namespaces() {
    let xform = generate();
    let root = &xform.document.root;
    assert_eq!(root.name, "xhtml:html");
    assert_eq!(
        root.attr("xmlns:xforms"),
        Some("http://www.w3.org/2002/xforms")
    );
    assert_eq!(root.attr("xmlns:po"), Some(TNS));

    let body = body_of(root);
    let group = body.child_elements().next().expect("root group");
    assert_eq!(group.local_name(), "group");
    assert_eq!(group.attr("id"), Some(ROOT_GROUP_ID));
    assert_eq!(label_text(group).as_deref(), Some("Order"));
}

#[test]
fn ids_are_unique_across_the_document() {
    let xform = generate();
    let ids: Vec<&str> = xform
        .document
        .root
        .descendants()
        .filter_map(|e| e.attr("id"))
        .filter(|id| !id.is_empty())
        .collect();
    let unique: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len(), "duplicate ids in {ids:?}");
}

#[test]
fn every_bind_reference_resolves() {
    let xform = generate();
    let root = &xform.document.root;
    let bind_ids: HashSet<&str> = descendants_named(model_of(root), "bind")
        .iter()
        .filter_map(|b| b.attr("id"))
        .collect();
    assert!(!bind_ids.is_empty());

    for el in body_of(root).descendants() {
        if let Some(referenced) = el.attr("xforms:bind") {
            assert!(
                bind_ids.contains(referenced),
                "{} references unknown bind {referenced}",
                el.name
            );
        }
    }
}

#[test]
fn repeated_element_gets_repeat_and_triggers() {
    let xform = generate();
    let root = &xform.document.root;
    let body = body_of(root);
    let model = model_of(root);

    let repeats = descendants_named(body, "repeat");
    assert_eq!(repeats.len(), 1);
    let repeat_id = repeats[0].attr("id").expect("repeat id");
    let bind_id = repeats[0].attr("xforms:bind").expect("repeat bind");

    let bind = descendants_named(model, "bind")
        .into_iter()
        .find(|b| b.attr("id") == Some(bind_id))
        .expect("item bind");
    assert_eq!(
        bind.attr("xforms:nodeset"),
        Some("po:item[position() != last()]")
    );
    assert_eq!(bind.attr("ext:minimum"), Some("2"));
    assert_eq!(bind.attr("xforms:constraint"), Some("count(.) >= 2"));

    for (suffix, label) in [
        ("insert_before", "insert at beginning"),
        ("insert_after", "insert after selected"),
        ("delete", "delete selected"),
    ] {
        let id = format!("{repeat_id}-{suffix}");
        let trigger = body
            .find(&|e| e.local_name() == "trigger" && e.attr("id") == Some(id.as_str()))
            .unwrap_or_else(|| panic!("missing trigger {id}"));
        assert_eq!(label_text(trigger).as_deref(), Some(label));
        assert_eq!(trigger.attr("xforms:bind"), Some(bind_id));
    }
}

#[test]
fn polymorphic_element_gets_switch() {
    let xform = generate();
    let body = body_of(&xform.document.root);

    let switches = descendants_named(body, "switch");
    assert_eq!(switches.len(), 1);
    let cases = descendants_named(switches[0], "case");
    assert_eq!(cases.len(), 2);
    let selected: Vec<&&Element> = cases
        .iter()
        .filter(|c| c.attr("xforms:selected") == Some("true"))
        .collect();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].attr("id"), cases[0].attr("id"));

    // The selector lists both concrete types, shallowest first.
    let selector = descendants_named(body, "select1")
        .into_iter()
        .find(|s| label_text(s).as_deref() == Some("Ship To Type"))
        .expect("type selector");
    let values: Vec<String> = descendants_named(selector, "value")
        .iter()
        .map(|v| v.text())
        .collect();
    assert_eq!(values, vec!["po:CanadianAddressType", "po:USAddressType"]);
}

#[test]
fn case_binds_are_conditioned_on_xsi_type() {
    let xform = generate();
    let model = model_of(&xform.document.root);

    let province_bind = descendants_named(model, "bind")
        .into_iter()
        .find(|b| b.attr("xforms:nodeset") == Some("po:province"))
        .expect("province bind");
    assert_eq!(
        province_bind.attr("xforms:relevant"),
        Some("../@xsi:type='po:CanadianAddressType'")
    );

    // The inherited street field is shared by both cases and never
    // toggled.
    let street_bind = descendants_named(model, "bind")
        .into_iter()
        .find(|b| b.attr("xforms:nodeset") == Some("po:street"))
        .expect("street bind");
    assert_eq!(street_bind.attr("xforms:relevant"), None);
}

#[test]
fn default_instance_reflects_occurrence() {
    let xform = generate();
    let instance = &xform.default_instance;
    assert_eq!(instance.name, "po:order");
    assert_eq!(instance.attr("xmlns:po"), Some(TNS));
    assert_eq!(instance.attr("orderDate"), Some(""));

    let items: Vec<&Element> = instance
        .child_elements()
        .filter(|c| c.name == "po:item")
        .collect();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].attr("ext:prototype"), None);
    assert_eq!(items[1].attr("ext:prototype"), Some("true"));

    let title = instance
        .child_elements()
        .find(|c| c.name == "po:title")
        .expect("title entry");
    assert_eq!(title.attr("xsi:nil"), None);

    let note = instance
        .child_elements()
        .find(|c| c.name == "po:note")
        .expect("note entry");
    assert_eq!(note.attr("xsi:nil"), Some("true"));

    // The polymorphic entry is typed after the default case and carries
    // that case's content.
    let ship_to = instance
        .child_elements()
        .find(|c| c.name == "po:shipTo")
        .expect("shipTo entry");
    assert_eq!(ship_to.attr("xsi:type"), Some("po:CanadianAddressType"));
    let fields: Vec<&str> = ship_to.child_elements().map(|c| c.name.as_str()).collect();
    assert_eq!(fields, vec!["po:street", "po:province"]);
}

#[test]
fn submissions_and_submits_are_paired() {
    let xform = generate();
    let root = &xform.document.root;
    let submissions = descendants_named(model_of(root), "submission");
    assert_eq!(submissions.len(), 2);
    assert_eq!(submissions[0].attr("xforms:validate"), Some("true"));
    assert_eq!(submissions[1].attr("xforms:validate"), Some("false"));

    let submits = descendants_named(body_of(root), "submit");
    assert_eq!(submits.len(), 2);
    assert_eq!(submits[0].attr("xforms:submission"), submissions[0].attr("id"));
    assert_eq!(submits[1].attr("xforms:submission"), submissions[1].attr("id"));
}

#[test]
fn attribute_control_is_labeled_from_its_name() {
    let xform = generate();
    let body = body_of(&xform.document.root);
    assert!(body
        .find(&|e| {
            e.local_name() == "input" && label_text(e).as_deref() == Some("Order Date")
        })
        .is_some());
}

#[test]
fn imported_instance_gains_prototype_entries() {
    let schema = SchemaModel::parse(ORDER_SCHEMA).expect("schema parses");

    let mut existing = Element::new("po:order");
    let mut title = Element::new("po:title");
    title.append_text("Q3 restock");
    existing.append_child(title);
    for sku in ["A-1", "A-2", "B-7"] {
        let mut item = Element::new("po:item");
        let mut sku_el = Element::new("po:sku");
        sku_el.append_text(sku);
        item.append_child(sku_el);
        existing.append_child(item);
    }

    let xform = XFormsBuilder::new(&schema)
        .build("order", Some(&existing))
        .expect("form generates");
    let model = model_of(&xform.document.root);

    let holders = descendants_named(model, "instance");
    assert_eq!(holders.len(), 2);
    assert_eq!(holders[1].attr("id"), Some("instance_prototype"));

    let imported = holders[0].child_elements().next().expect("imported root");
    let items: Vec<&Element> = imported
        .child_elements()
        .filter(|c| c.name == "po:item")
        .collect();
    assert_eq!(items.len(), 4);
    assert!(items[..3].iter().all(|i| i.attr("ext:prototype").is_none()));
    assert_eq!(items[3].attr("ext:prototype"), Some("true"));

    // Stripping is the inverse of grafting.
    let mut stripped = imported.clone();
    remove_prototype_nodes(&mut stripped);
    let remaining: Vec<&Element> = stripped
        .child_elements()
        .filter(|c| c.name == "po:item")
        .collect();
    assert_eq!(remaining.len(), 3);
    assert!(remaining.iter().all(|i| i.attr("ext:prototype").is_none()));
}

#[test]
fn mismatched_instance_root_is_rejected() {
    let schema = SchemaModel::parse(ORDER_SCHEMA).expect("schema parses");
    let err = XFormsBuilder::new(&schema)
        .build("order", Some(&Element::new("po:invoice")))
        .expect_err("mismatch rejected");
    assert!(matches!(err, Error::InstanceRootMismatch { .. }));
}

#[test]
fn unknown_root_element_is_rejected() {
    let schema = SchemaModel::parse(ORDER_SCHEMA).expect("schema parses");
    let err = XFormsBuilder::new(&schema)
        .build("invoice", None)
        .expect_err("unknown root rejected");
    assert!(matches!(err, Error::InvalidRootElement { .. }));
}
