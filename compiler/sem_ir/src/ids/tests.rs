use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_entity_id_display_and_segments() {
    let id = EntityId::of("List.get");
    assert_eq!(id.to_string(), "List.get");
    assert_eq!(id.segments().len(), 2);
    assert_eq!(id.single_segment(), None);
    assert_eq!(EntityId::of("x").single_segment(), Some("x"));
}

#[test]
fn test_entity_id_rejects_empty_segments() {
    assert_eq!(
        EntityId::parse("List..get"),
        Err(IdError::InvalidEntityId("List..get".to_string()))
    );
    assert!(EntityId::new(Vec::new()).is_err());
    assert!(EntityId::parse("Unicode.String").is_ok());
}

#[test]
fn test_child_appends_segment() {
    let adapter = EntityId::of("Shape").child("Adapter");
    assert_eq!(adapter, EntityId::of("Shape.Adapter"));
    assert_eq!(adapter.parent(), Some(EntityId::of("Shape")));
    assert_eq!(adapter.last_segment(), "Adapter");
    assert_eq!(EntityId::of("Shape").parent(), None);
}

#[test]
fn test_module_name_validation() {
    assert!(ModuleName::new("semlang", "lang").is_ok());
    assert!(ModuleName::new("my-group", "mod_1.x").is_ok());
    assert!(ModuleName::new("bad group", "lang").is_err());
    assert!(ModuleName::new("group", "trailing-").is_err());
    assert!(ModuleName::new("group", "double__sep").is_err());
    assert!(ModuleName::new("", "lang").is_err());
}

#[test]
fn test_module_ref_requires_group_for_version() {
    assert_eq!(
        ModuleRef::new(None, "lang", Some("0".to_string())),
        Err(IdError::VersionWithoutGroup("lang".to_string()))
    );
}

#[test]
fn test_module_ref_matching() {
    let name = ModuleName::new("semlang", "lang").unwrap();
    let id = ModuleUniqueId::new(name, "0");

    let module_only = ModuleRef::new(None, "lang", None).unwrap();
    assert!(module_only.matches(&id));

    let wrong_group = ModuleRef::new(Some("other".to_string()), "lang", None)
        .unwrap();
    assert!(!wrong_group.matches(&id));

    let versioned = ModuleRef::new(Some("semlang".to_string()), "lang", Some("1".to_string()))
        .unwrap();
    assert!(!versioned.matches(&id));
    assert_eq!(versioned.to_string(), "semlang:lang:1");
}
