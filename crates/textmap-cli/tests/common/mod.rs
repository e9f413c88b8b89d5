//! Shared helpers for the `pdf-textmap` integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;

pub fn cmd() -> Command {
    Command::cargo_bin("pdf-textmap").unwrap()
}

/// Create a PDF whose pages carry the given content streams.
/// Every page is US Letter with Helvetica as /F1.
pub fn pdf_with_pages(contents: &[&str]) -> Vec<u8> {
    use lopdf::{Object, Stream, dictionary};

    let mut doc = lopdf::Document::with_version("1.5");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let media_box = vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(612),
        Object::Integer(792),
    ];

    let mut page_ids = Vec::new();
    for content in contents {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => media_box.clone(),
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            },
        });
        page_ids.push(page_id);
    }

    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        "Count" => Object::Integer(page_ids.len() as i64),
    });
    for page_id in &page_ids {
        if let Ok(dict) = doc.get_object_mut(*page_id).and_then(|o| o.as_dict_mut()) {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// One text object drawing `text` at (`x`, `y`) in 12pt Helvetica.
pub fn text_at(x: u32, y: u32, text: &str) -> String {
    format!("BT /F1 12 Tf {x} {y} Td ({text}) Tj ET\n")
}

pub fn write_pdf(dir: &Path, name: &str, contents: &[&str]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, pdf_with_pages(contents)).unwrap();
    path
}

pub fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

/// Number of annotations on each page of the PDF at `path`.
pub fn annotation_counts(path: &Path) -> Vec<usize> {
    let doc = lopdf::Document::load_mem(&std::fs::read(path).unwrap()).unwrap();
    count_annotations(&doc)
}

/// Like [`annotation_counts`], reloading with `password` when the saved
/// file is still encrypted.
pub fn annotation_counts_with_password(path: &Path, password: &str) -> Vec<usize> {
    let bytes = std::fs::read(path).unwrap();
    let doc = match lopdf::Document::load_mem(&bytes) {
        Ok(doc) if !doc.is_encrypted() => doc,
        _ => lopdf::Document::load_mem_with_password(&bytes, password).unwrap(),
    };
    count_annotations(&doc)
}

fn count_annotations(doc: &lopdf::Document) -> Vec<usize> {
    doc.get_pages()
        .values()
        .map(|id| {
            let page = doc.get_object(*id).unwrap().as_dict().unwrap();
            match page.get(b"Annots") {
                Ok(lopdf::Object::Array(items)) => items.len(),
                Ok(lopdf::Object::Reference(r)) => {
                    doc.get_object(*r).unwrap().as_array().unwrap().len()
                }
                _ => 0,
            }
        })
        .collect()
}

/// PDF standard padding bytes used in encryption key derivation.
const PAD_BYTES: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08,
    0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut s: Vec<u8> = (0..=255).collect();
    let mut j = 0usize;
    for i in 0..256 {
        j = (j + s[i] as usize + key[i % key.len()] as usize) & 0xFF;
        s.swap(i, j);
    }
    let (mut i, mut j) = (0usize, 0usize);
    data.iter()
        .map(|&byte| {
            i = (i + 1) & 0xFF;
            j = (j + s[i] as usize) & 0xFF;
            s.swap(i, j);
            byte ^ s[(s[i] as usize + s[j] as usize) & 0xFF]
        })
        .collect()
}

/// Write a PDF of `contents` encrypted with RC4 40-bit (V=1, R=2) under
/// `user_password`.
pub fn write_encrypted_pdf(
    dir: &Path,
    name: &str,
    contents: &[&str],
    user_password: &str,
) -> PathBuf {
    use lopdf::{Object, StringFormat, dictionary};

    let file_id = b"textmapclifileid";
    let permissions: i32 = -4;

    let password = user_password.as_bytes();
    let mut padded = password[..password.len().min(32)].to_vec();
    padded.extend_from_slice(&PAD_BYTES[..32 - padded.len()]);

    let owner_key = md5::compute(&padded);
    let o_value = rc4(&owner_key[..5], &padded);

    let mut key_input = padded.clone();
    key_input.extend_from_slice(&o_value);
    key_input.extend_from_slice(&(permissions as u32).to_le_bytes());
    key_input.extend_from_slice(file_id);
    let enc_key = md5::compute(&key_input)[..5].to_vec();
    let u_value = rc4(&enc_key, &PAD_BYTES);

    let mut doc = lopdf::Document::load_mem(&pdf_with_pages(contents)).unwrap();
    for (&(num, generation), obj) in doc.objects.iter_mut() {
        let mut obj_key_input = enc_key.clone();
        obj_key_input.extend_from_slice(&num.to_le_bytes()[..3]);
        obj_key_input.extend_from_slice(&generation.to_le_bytes()[..2]);
        let digest = md5::compute(&obj_key_input);
        let obj_key = &digest[..(enc_key.len() + 5).min(16)];
        match obj {
            Object::Stream(stream) => {
                let encrypted = rc4(obj_key, &stream.content);
                stream.set_content(encrypted);
            }
            Object::String(content, _) => *content = rc4(obj_key, content),
            _ => {}
        }
    }

    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1_i64,
        "R" => 2_i64,
        "Length" => 40_i64,
        "O" => Object::String(o_value, StringFormat::Literal),
        "U" => Object::String(u_value, StringFormat::Literal),
        "P" => permissions as i64,
    });
    doc.trailer.set("Encrypt", Object::Reference(encrypt_id));
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(file_id.to_vec(), StringFormat::Literal),
            Object::String(file_id.to_vec(), StringFormat::Literal),
        ]),
    );

    let path = dir.join(name);
    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    std::fs::write(&path, buf).unwrap();
    path
}
