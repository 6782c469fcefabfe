//! Converts `.proto` sources into the canonical [`ProtoFile`] graph.
//!
//! Parsing goes through `protobuf-parse`'s pure Rust parser; the resulting
//! `FileDescriptorProto` is then walked into the comparison model.

use crate::canonical::{
    FieldRule, ProtoEnum, ProtoEnumValue, ProtoField, ProtoFile, ProtoMessage, ProtoService,
    RpcMethod,
};
use anyhow::Context;
use protobuf::descriptor::{
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    MethodDescriptorProto, ServiceDescriptorProto, field_descriptor_proto,
};
use protobuf_parse::Parser;
use tracing::debug;

/// Parses the content of a `.proto` file into a [`ProtoFile`].
///
/// Imports other than the well-known `google/protobuf/*` files are replaced
/// by empty stand-ins, so a single file can be parsed without its
/// dependency tree.
pub fn parse_proto(proto_content: &str) -> anyhow::Result<ProtoFile> {
    // The parser works with the filesystem, so the content goes into a
    // temporary directory first.
    let temp_dir = tempfile::tempdir().context("Failed to create temp directory")?;
    let file_name = "input.proto";
    let temp_path = temp_dir.path().join(file_name);
    std::fs::write(&temp_path, proto_content).context("Failed to write to temp file")?;

    for line in proto_content.lines() {
        let line = line.trim();
        if !line.starts_with("import ") {
            continue;
        }
        let path_str = line
            .trim_start_matches("import ")
            .trim_start_matches("public ")
            .trim_start_matches("weak ")
            .trim_matches(|c| c == '"' || c == ';');

        // A stand-in would shadow the parser's built-in well-known types.
        if path_str.starts_with("google/protobuf/") {
            continue;
        }
        let import_path = temp_dir.path().join(path_str);
        if let Some(parent) = import_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create parent dirs for import: {path_str}"))?;
        }
        std::fs::write(&import_path, "syntax = \"proto3\";")
            .with_context(|| format!("Failed to create stand-in import file: {path_str}"))?;
        debug!(import = %path_str, "replaced import with an empty stand-in");
    }

    let parsed = Parser::new()
        .pure()
        .include(temp_dir.path())
        .input(&temp_path)
        .file_descriptor_set()
        .context("Protobuf parsing failed")?;

    let file_descriptor = parsed
        .file
        .into_iter()
        .find(|d| d.name() == file_name)
        .context("Could not find the parsed file descriptor for the input file")?;

    Ok(normalize_file(&file_descriptor))
}

pub fn normalize_file(file: &FileDescriptorProto) -> ProtoFile {
    let syntax = match file.syntax() {
        "" => "proto2".to_string(),
        other => other.to_string(),
    };
    let package = file.package.clone().filter(|p| !p.is_empty());
    let proto2 = syntax == "proto2";

    ProtoFile {
        name: package.clone().unwrap_or_default(),
        version: String::new(),
        syntax,
        package,
        services: file.service.iter().map(normalize_service).collect(),
        messages: file
            .message_type
            .iter()
            .map(|msg| normalize_message(msg, proto2))
            .collect(),
        enums: file.enum_type.iter().map(normalize_enum).collect(),
    }
}

fn normalize_message(msg: &DescriptorProto, proto2: bool) -> ProtoMessage {
    // `map<K, V>` fields are compiled to repeated fields of a synthetic
    // nested `...Entry` message.
    let map_entries: Vec<&DescriptorProto> = msg
        .nested_type
        .iter()
        .filter(|nested| nested.options.get_or_default().map_entry())
        .collect();

    let fields = msg
        .field
        .iter()
        .map(|field| {
            let entry = map_entries.iter().find(|entry| {
                field.label() == field_descriptor_proto::Label::LABEL_REPEATED
                    && field.type_name().rsplit('.').next() == Some(entry.name())
            });
            match entry {
                Some(entry) => normalize_map_field(field, entry),
                None => normalize_field(field, proto2),
            }
        })
        .collect();

    ProtoMessage {
        name: msg.name().to_string(),
        fields,
        nested_messages: msg
            .nested_type
            .iter()
            .filter(|nested| !nested.options.get_or_default().map_entry())
            .map(|nested| normalize_message(nested, proto2))
            .collect(),
        nested_enums: msg.enum_type.iter().map(normalize_enum).collect(),
    }
}

fn normalize_field(field: &FieldDescriptorProto, proto2: bool) -> ProtoField {
    let rule = match field.label() {
        field_descriptor_proto::Label::LABEL_REPEATED => FieldRule::Repeated,
        field_descriptor_proto::Label::LABEL_REQUIRED => FieldRule::Required,
        field_descriptor_proto::Label::LABEL_OPTIONAL if proto2 || field.proto3_optional() => {
            FieldRule::Optional
        }
        field_descriptor_proto::Label::LABEL_OPTIONAL => FieldRule::Singular,
    };

    ProtoField {
        name: field.name().to_string(),
        number: field.number(),
        type_name: field_type_name(field),
        rule,
        map_key_type: None,
        map_value_type: None,
        deprecated: field.options.get_or_default().deprecated(),
    }
}

fn normalize_map_field(field: &FieldDescriptorProto, entry: &DescriptorProto) -> ProtoField {
    let entry_type = |number: i32| {
        entry
            .field
            .iter()
            .find(|f| f.number() == number)
            .map(field_type_name)
            .unwrap_or_default()
    };
    let key = entry_type(1);
    let value = entry_type(2);

    let mut map = ProtoField::map(field.name(), field.number(), &key, &value);
    map.deprecated = field.options.get_or_default().deprecated();
    map
}

/// Scalar types by their proto keyword (`int32`, `string`, ...); message and
/// enum types by their fully qualified name.
fn field_type_name(field: &FieldDescriptorProto) -> String {
    if field.type_name().is_empty() {
        format!("{:?}", field.type_())
            .to_lowercase()
            .replace("type_", "")
    } else {
        field.type_name().to_string()
    }
}

fn normalize_enum(en: &EnumDescriptorProto) -> ProtoEnum {
    ProtoEnum {
        name: en.name().to_string(),
        values: en
            .value
            .iter()
            .map(|value| ProtoEnumValue {
                name: value.name().to_string(),
                number: value.number(),
            })
            .collect(),
    }
}

fn normalize_service(svc: &ServiceDescriptorProto) -> ProtoService {
    ProtoService {
        name: svc.name().to_string(),
        methods: svc.method.iter().map(normalize_method).collect(),
    }
}

fn normalize_method(method: &MethodDescriptorProto) -> RpcMethod {
    RpcMethod {
        name: method.name().to_string(),
        input_type: method.input_type().to_string(),
        output_type: method.output_type().to_string(),
        client_streaming: method.client_streaming(),
        server_streaming: method.server_streaming(),
        deprecated: method.options.get_or_default().deprecated(),
    }
}
