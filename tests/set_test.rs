//! 集合与去重集合测试

use rat_quickmodel::*;
use std::sync::Arc;

fn setup() -> (ModelRegistry, Arc<ModelSchema>) {
    let registry = ModelRegistry::new();
    let person = registry
        .register(
            ModelDefinition::new("Person", "people.models")
                .verbose_name_plural("People")
                .field("name", char_field(40).primary_key())
                .field("age", integer_field()),
        )
        .unwrap();
    (registry, person)
}

fn named(schema: &Arc<ModelSchema>, name: &str, age: i64) -> ModelInstance {
    schema
        .create([("name", AttrValue::from(name)), ("age", AttrValue::from(age))])
        .unwrap()
}

#[test]
fn test_modelset_list_behaviour() {
    let (_registry, person) = setup();
    let ann = named(&person, "Ann", 20);
    let bob = named(&person, "Bob", 30);

    let set = person.set_of(vec![ann.clone(), bob.clone()]).unwrap();
    assert_eq!(set.len(), 2);
    assert!(!set.is_empty());
    assert_eq!(set[0], ann);
    assert_eq!(&set[1..], &[bob.clone()][..]);
    let names: Vec<&DataValue> = set.iter().filter_map(|p| p.get("name")).collect();
    assert_eq!(names, vec![&DataValue::from("Ann"), &DataValue::from("Bob")]);
    assert_eq!(set.to_string(), "Person.Set([<Person(name=Ann) object>, <Person(name=Bob) object>])");

    assert!(person.set().is_empty());
}

#[test]
fn test_modelset_rejects_other_models() {
    let (registry, person) = setup();
    let robot = registry
        .register(ModelDefinition::new("Robot", "misc.models").field("name", char_field(40)))
        .unwrap();
    let r2 = robot.create([("name", AttrValue::from("R2"))]).unwrap();

    assert!(person.set_of(vec![r2.clone()]).unwrap_err().is_type_error());
    let mut set = person.set();
    assert!(set.add(r2).unwrap_err().is_type_error());
}

#[test]
fn test_modelset_add_and_remove() {
    let (_registry, person) = setup();
    let ann = named(&person, "Ann", 20);
    let mut set = person.set();
    set.add(ann.clone()).unwrap();
    set.add(named(&person, "Bob", 30)).unwrap();
    set.remove(&ann).unwrap();
    assert_eq!(set.len(), 1);
    let err = set.remove(&ann).unwrap_err();
    assert!(matches!(err, QuickModelError::NotInCollection { .. }));
}

#[test]
fn test_modelset_dict_round_trip() {
    let (_registry, person) = setup();
    let set = person
        .set_of(vec![named(&person, "Ann", 20), named(&person, "Bob", 30)])
        .unwrap();

    let dict = set.to_dict().unwrap();
    let (plural, items) = dict.as_single_entry().unwrap();
    assert_eq!(plural, "People");
    assert_eq!(items.as_array().unwrap().len(), 2);

    let again = ModelSet::from_dict(&person, &dict).unwrap();
    assert_eq!(again, set);
    assert_eq!(again.to_dict().unwrap(), dict);

    let wrong = DataValue::single("Persons", DataValue::Array(Vec::new()));
    assert!(ModelSet::from_dict(&person, &wrong).unwrap_err().is_type_error());
}

#[test]
fn test_manager_deduplicates_by_hash() {
    let (_registry, person) = setup();
    let mut manager = person.set_manager();

    manager.add(named(&person, "Ann", 20)).unwrap();
    manager.add(named(&person, "Bob", 30)).unwrap();
    manager.add(named(&person, "Ann", 21)).unwrap();

    assert_eq!(manager.len(), 2);
    let ages: Vec<&DataValue> = manager.iter().filter_map(|p| p.get("age")).collect();
    assert_eq!(ages, vec![&DataValue::Int(21), &DataValue::Int(30)]);
}

#[test]
fn test_manager_without_primary_key_hashes_all_fields() {
    let registry = ModelRegistry::new();
    let note = registry
        .register(
            ModelDefinition::new("Note", "misc.models")
                .field("title", char_field(40))
                .field("body", text_field()),
        )
        .unwrap();

    let mut manager = note.set_manager();
    let first = note
        .create([("title", AttrValue::from("a")), ("body", AttrValue::from("x"))])
        .unwrap();
    let same = note
        .create([("title", AttrValue::from("a")), ("body", AttrValue::from("x"))])
        .unwrap();
    let other = note
        .create([("title", AttrValue::from("a")), ("body", AttrValue::from("y"))])
        .unwrap();
    manager.add(first).unwrap();
    manager.add(same).unwrap();
    manager.add(other).unwrap();
    assert_eq!(manager.len(), 2);
}

#[test]
fn test_manager_remove_and_snapshot() {
    let (_registry, person) = setup();
    let ann = named(&person, "Ann", 20);
    let mut manager = person.set_manager();
    manager.add(ann.clone()).unwrap();
    manager.add(named(&person, "Bob", 30)).unwrap();

    let snapshot = manager.as_modelset();
    manager.remove(&ann).unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(manager.len(), 1);
    assert!(!manager.contains(&ann));

    let err = manager.remove(&ann).unwrap_err();
    assert!(matches!(err, QuickModelError::NotInCollection { .. }));
}

#[test]
fn test_manager_dict_round_trip() {
    let (_registry, person) = setup();
    let mut manager = person.set_manager();
    manager.add(named(&person, "Ann", 20)).unwrap();
    manager.add(named(&person, "Bob", 30)).unwrap();

    let dict = manager.to_dict().unwrap();
    let again = ModelSetManager::from_dict(&person, &dict).unwrap();
    assert_eq!(again.len(), 2);
    assert_eq!(again.as_modelset(), manager.as_modelset());
}
