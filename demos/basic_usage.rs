//! RatQuickModel 基本使用示例
//!
//! 本示例展示了如何声明模型、在 JSON/XML 之间往返，
//! 以及使用文件存储保存和查询实例。

use rat_logger::{LoggerBuilder, handler::term::TermConfig};
use rat_quickmodel::*;

#[tokio::main]
async fn main() -> QuickModelResult<()> {
    // 初始化日志
    LoggerBuilder::new()
        .add_terminal_with_config(TermConfig::default())
        .init()
        .expect("日志初始化失败");

    let storage_dir = std::env::temp_dir().join("rat_quickmodel_demo");
    std::fs::create_dir_all(&storage_dir)?;

    let config = GlobalConfig::builder()
        .default_validation_policy(ValidationPolicy::ValidateAll)
        .url_check_timeout_secs(5)
        .json_pretty(false)
        .xml_declaration(false)
        .storage_base_path(&storage_dir)
        .language("zh-CN")
        .build()?;
    rat_quickmodel::init_with_config(&config);

    println!("=== RatQuickModel 基本使用示例 ===");
    println!("库版本: {}", rat_quickmodel::get_info());

    // 1. 声明模型，Person 先于 House 声明，关系在 finalize 时解析
    println!("\n1. 声明模型...");
    let registry = ModelRegistry::with_config(&config);
    let person = registry.declare(
        ModelDefinition::new("Person", "people.models")
            .verbose_name_plural("People")
            .field("name", char_field(40).primary_key())
            .field("age", integer_field())
            .field("birthdate", date_field(None))
            .field("email", email_field(None))
            .foreign_key("live_in", "House")
            .many_to_many("friends", "self"),
    )?;
    let house = registry.declare(
        ModelDefinition::new("House", "city.models")
            .field("address", char_field(100).primary_key())
            .field("price", decimal_field(8, 2)),
    )?;
    registry.finalize()?;
    println!("✅ 已声明: {} / {}", person, house);

    // 2. 创建实例
    println!("\n2. 创建实例...");
    let franklin = house.create([
        ("address", AttrValue::from("Franklin St.")),
        ("price", AttrValue::from("250000.00")),
    ])?;
    let bob = person.create([("name", AttrValue::from("Bob")), ("age", AttrValue::from(41))])?;
    let john = person.create([
        ("name", AttrValue::from("John")),
        ("age", AttrValue::from("30")),
        ("birthdate", AttrValue::from("1979-03-01")),
        ("email", AttrValue::from("john@example.com")),
        ("live_in", AttrValue::from(franklin)),
        ("friends", AttrValue::from(vec![bob])),
    ])?;
    println!("✅ {}", john);

    // 3. 校验失败的写入
    println!("\n3. 校验...");
    match person.create([("email", AttrValue::from("not-an-email"))]) {
        Err(e) if e.is_validation_error() => println!("✅ 内容校验错误: {}", e),
        other => println!("❌ 预期校验错误，得到 {:?}", other),
    }

    // 4. JSON / XML 往返
    println!("\n4. 序列化...");
    let json = john.serialize("json")?;
    println!("JSON: {}", json);
    let from_json = person.deserialize(&json, "json")?;
    println!("✅ JSON 往返相等: {}", from_json == john);

    let xml = john.serialize("xml")?;
    println!("XML: {}", xml);

    // 5. 文件存储
    println!("\n5. 文件存储...");
    let manager = FileSystemManager::from_config(&person, &config)?;
    manager.add(john.clone()).await?;
    manager
        .create(vec![
            ("name".to_string(), AttrValue::from("Ann")),
            ("age".to_string(), AttrValue::from(30)),
        ])
        .await?;

    let thirty = manager.filter(&[("age", DataValue::from(30))]).await?;
    println!("✅ 年龄为 30 的人: {}", thirty);
    println!("数据文件: {:?}", manager.file_path());

    manager.delete_set(&manager.all().await?).await?;
    println!("✅ 已清空");

    Ok(())
}
