//! 模型实例运行时测试：字段写入、字典往返、相等规则、外部对象抓取

use rat_quickmodel::model::{ArityError, AttributeSource, SourceValue};
use rat_quickmodel::*;
use std::collections::HashMap;
use std::sync::Arc;

fn person_model(registry: &ModelRegistry) -> Arc<ModelSchema> {
    registry
        .register(
            ModelDefinition::new("Person", "people.models")
                .field("first_name", char_field(10))
                .field("age", integer_field())
                .field("birthdate", date_field(None))
                .field("married", boolean_field(vec!["yes".into()], vec!["no".into()])),
        )
        .unwrap()
}

fn person_dict(body: Vec<(&str, DataValue)>) -> DataValue {
    let body: HashMap<String, DataValue> = body.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    DataValue::single("Person", DataValue::Object(body))
}

#[test]
fn test_char_field_from_dict_errors() {
    let registry = ModelRegistry::new();
    let person = person_model(&registry);

    let err = person
        .from_dict(&person_dict(vec![("first_name", "blahblahblah".into())]))
        .unwrap_err();
    assert!(err.is_validation_error());

    let err = person.from_dict(&person_dict(vec![("first_name", 0.into())])).unwrap_err();
    assert!(err.is_type_error());

    let err = person.from_dict(&person_dict(vec![("first_name", DataValue::Null)])).unwrap_err();
    assert!(err.is_type_error());
}

#[test]
fn test_decimal_field_on_model() {
    let registry = ModelRegistry::new();
    let product = registry
        .register(ModelDefinition::new("Product", "shop.models").field("price", decimal_field(6, 2)))
        .unwrap();

    let instance = product.create([("price", AttrValue::from("4000.55"))]).unwrap();
    assert_eq!(instance.get("price"), Some(&DataValue::Decimal("4000.55".parse().unwrap())));

    let dict = instance.to_dict().unwrap();
    let (_, body) = dict.as_single_entry().unwrap();
    assert_eq!(body.as_object().unwrap().get("price"), Some(&DataValue::from("4000.55")));

    let narrow = registry
        .register(ModelDefinition::new("Coin", "shop.models").field("price", decimal_field(2, 2)))
        .unwrap();
    assert!(narrow.create([("price", AttrValue::from("4000.55"))]).unwrap_err().is_validation_error());
}

#[test]
fn test_boolean_field_on_model() {
    let registry = ModelRegistry::new();
    let flag = registry
        .register(ModelDefinition::new("Flag", "misc.models").field(
            "on",
            boolean_field(vec!["true".into(), "yes".into()], vec!["false".into(), "no".into()]),
        ))
        .unwrap();

    let instance = flag.create([("on", AttrValue::from("True"))]).unwrap();
    assert_eq!(instance.get("on"), Some(&DataValue::Bool(true)));
    let instance = flag.create([("on", AttrValue::from("yes"))]).unwrap();
    assert_eq!(instance.get("on"), Some(&DataValue::Bool(true)));
    let err = flag.create([("on", AttrValue::Value(DataValue::Null))]).unwrap_err();
    assert!(err.is_type_error());
}

#[test]
fn test_unknown_keyword_is_attribute_error() {
    let registry = ModelRegistry::new();
    let person = person_model(&registry);
    let err = person.create([("nickname", AttrValue::from("Bob"))]).unwrap_err();
    assert!(matches!(err, QuickModelError::AttributeError { .. }));
    assert!(err.is_type_error());
}

#[test]
fn test_validate_none_skips_validation_but_converts() {
    let registry = ModelRegistry::new();
    let loose = registry
        .register(
            ModelDefinition::new("Loose", "misc.models")
                .validation_policy(ValidationPolicy::ValidateNone)
                .field("name", char_field(3))
                .field("count", integer_field()),
        )
        .unwrap();

    let instance = loose
        .create([("name", AttrValue::from("far too long")), ("count", AttrValue::from("12"))])
        .unwrap();
    assert_eq!(instance.get("name"), Some(&DataValue::from("far too long")));
    assert_eq!(instance.get("count"), Some(&DataValue::Int(12)));

    // 类型转换仍然执行
    let err = loose.create([("count", AttrValue::from("twelve"))]).unwrap_err();
    assert!(err.is_validation_error());
}

#[test]
fn test_dict_round_trip() {
    let registry = ModelRegistry::new();
    let person = person_model(&registry);

    let john = person
        .create([
            ("first_name", AttrValue::from("John")),
            ("age", AttrValue::from(30)),
            ("birthdate", AttrValue::from("1979-03-01")),
            ("married", AttrValue::from("yes")),
        ])
        .unwrap();

    let dict = john.to_dict().unwrap();
    let (key, body) = dict.as_single_entry().unwrap();
    assert_eq!(key, "Person");
    assert_eq!(body.as_object().unwrap().get("birthdate"), Some(&DataValue::from("1979-03-01")));

    let again = person.from_dict(&dict).unwrap();
    assert_eq!(again, john);
    assert_eq!(again.values(), john.values());
}

#[test]
fn test_unset_fields_are_omitted() {
    let registry = ModelRegistry::new();
    let person = person_model(&registry);
    let dict = person.create([("first_name", AttrValue::from("Ann"))]).unwrap().to_dict().unwrap();
    let (_, body) = dict.as_single_entry().unwrap();
    let body = body.as_object().unwrap();
    assert_eq!(body.len(), 1);
    assert!(body.contains_key("first_name"));
}

#[test]
fn test_from_dict_structural_errors() {
    let registry = ModelRegistry::new();
    let person = person_model(&registry);

    assert!(person.from_dict(&DataValue::from("Person")).unwrap_err().is_type_error());
    let wrong_key = DataValue::single("House", DataValue::Object(HashMap::new()));
    assert!(person.from_dict(&wrong_key).unwrap_err().is_type_error());
}

#[test]
fn test_from_dict_ignores_unknown_keys() {
    let registry = ModelRegistry::new();
    let person = person_model(&registry);
    let instance = person
        .from_dict(&person_dict(vec![("first_name", "Ann".into()), ("shoe_size", 38.into())]))
        .unwrap();
    assert_eq!(instance.get("first_name"), Some(&DataValue::from("Ann")));
}

#[test]
fn test_partial_construction_on_error() {
    let registry = ModelRegistry::new();
    let person = person_model(&registry);

    let mut instance = person.instance();
    let err = instance
        .load_dict(&person_dict(vec![("first_name", "Ann".into()), ("age", "old".into())]))
        .unwrap_err();
    assert!(err.is_validation_error());
    // 声明顺序在前的字段已经写入
    assert_eq!(instance.get("first_name"), Some(&DataValue::from("Ann")));
    assert_eq!(instance.get("age"), None);

    // 结构错误不会写入任何字段
    let mut untouched = person.instance();
    assert!(untouched.load_dict(&DataValue::Int(1)).is_err());
    assert!(untouched.values().is_empty());
}

#[test]
fn test_equality_with_primary_key() {
    let registry = ModelRegistry::new();
    let house = registry
        .register(
            ModelDefinition::new("House", "city.models")
                .field("address", char_field(100).primary_key())
                .field("floors", integer_field()),
        )
        .unwrap();

    let a = house
        .create([("address", AttrValue::from("Franklin St.")), ("floors", AttrValue::from(2))])
        .unwrap();
    let b = house
        .create([("address", AttrValue::from("Franklin St.")), ("floors", AttrValue::from(5))])
        .unwrap();
    let c = house.create([("address", AttrValue::from("Main St."))]).unwrap();

    assert_eq!(a, b);
    assert_eq!(a.identity_hash(), b.identity_hash());
    assert_ne!(a, c);
    assert_eq!(a.to_string(), "<House(address=Franklin St.) object>");
}

#[test]
fn test_equality_without_primary_key() {
    let registry = ModelRegistry::new();
    let person = person_model(&registry);

    let a = person.create([("first_name", AttrValue::from("Ann")), ("age", AttrValue::from(3))]).unwrap();
    let b = person.create([("first_name", AttrValue::from("Ann")), ("age", AttrValue::from("3"))]).unwrap();
    let c = person.create([("first_name", AttrValue::from("Ann")), ("age", AttrValue::from(4))]).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a.identity_hash(), c.identity_hash());
}

#[test]
fn test_cross_model_comparison_is_type_error() {
    let registry = ModelRegistry::new();
    let person = person_model(&registry);
    let other = registry
        .register(ModelDefinition::new("Robot", "misc.models").field("first_name", char_field(10)))
        .unwrap();

    let a = person.create([("first_name", AttrValue::from("Ann"))]).unwrap();
    let b = other.create([("first_name", AttrValue::from("Ann"))]).unwrap();
    assert!(a.try_eq(&b).unwrap_err().is_type_error());
    assert_ne!(a, b);
}

#[test]
fn test_is_valid_tracks_non_blank_fields() {
    let registry = ModelRegistry::new();
    let account = registry
        .register(
            ModelDefinition::new("Account", "bank.models")
                .field("owner", char_field(20).blank(false))
                .field("note", text_field()),
        )
        .unwrap();

    let mut instance = account.instance();
    assert!(!instance.is_valid());
    instance.set("owner", "Ann").unwrap();
    assert!(instance.is_valid());
}

struct Legacy {
    name: &'static str,
}

impl AttributeSource for Legacy {
    fn attribute(&self, name: &str) -> Option<SourceValue> {
        let name_value = self.name;
        match name {
            "first_name" => Some(SourceValue::Callable(Box::new(move || Ok::<_, anyhow::Error>(DataValue::from(name_value))))),
            "age" => Some(SourceValue::Callable(Box::new(|| {
                Err::<DataValue, _>(anyhow::Error::new(ArityError("age() 需要 1 个参数".to_string())))
            }))),
            "birthdate" => Some(SourceValue::Value(DataValue::Null)),
            _ => None,
        }
    }
}

#[test]
fn test_fill_from_object() {
    let registry = ModelRegistry::new();
    let person = person_model(&registry);

    let instance = person.fill_from_object(&Legacy { name: "Gabriel" }).unwrap();
    assert_eq!(instance.get("first_name"), Some(&DataValue::from("Gabriel")));
    assert_eq!(instance.get("age"), None);
    assert_eq!(instance.get("birthdate"), None);

    let mut source = HashMap::new();
    source.insert("age".to_string(), DataValue::from("41"));
    let instance = person.fill_from_object(&source).unwrap();
    assert_eq!(instance.get("age"), Some(&DataValue::Int(41)));
}

struct FakeChecker {
    existing: Vec<&'static str>,
}

impl UrlChecker for FakeChecker {
    fn is_valid(&self, url: &str) -> bool {
        rat_quickmodel::model::url_checker::is_valid_url(url)
    }

    fn exists(&self, url: &str) -> bool {
        self.existing.iter().any(|existing| *existing == url)
    }
}

#[test]
fn test_url_field_with_injected_checker() {
    let registry = ModelRegistry::new();
    let checker = Arc::new(FakeChecker { existing: vec!["http://nacaolivre.org"] });
    let site = registry
        .register(
            ModelDefinition::new("Site", "web.models")
                .field("url", url_field(None).verify_exists(true).with_url_checker(checker)),
        )
        .unwrap();

    site.create([("url", AttrValue::from("http://nacaolivre.org"))]).unwrap();
    let err = site.create([("url", AttrValue::from("http://gone.example.com"))]).unwrap_err();
    assert!(err.is_validation_error());
    let err = site.create([("url", AttrValue::from("ftp://nacaolivre.org"))]).unwrap_err();
    assert!(err.is_validation_error());
}
