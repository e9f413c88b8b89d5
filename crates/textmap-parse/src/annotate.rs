//! Rectangle annotations drawn around text blocks.
//!
//! Each box becomes a `/Square` annotation with a black 1pt border, no fill
//! and its own appearance stream so viewers render it without regenerating
//! appearances.

use lopdf::{Dictionary, Object, ObjectId, Stream, dictionary};
use textmap_core::BBox;
use tracing::debug;

use crate::error::BackendError;
use crate::lopdf_backend::LopdfDocument;

/// Border width of the drawn rectangles, in points.
pub const BORDER_WIDTH: f64 = 1.0;

/// Annotation flag bit 3: print the annotation.
const FLAG_PRINT: i64 = 4;

fn reals(values: &[f64]) -> Object {
    Object::Array(values.iter().map(|v| Object::Real(*v as f32)).collect())
}

/// Appearance stream stroking the rectangle's inner edge.
fn appearance_stream(width: f64, height: f64) -> Stream {
    let inset = BORDER_WIDTH / 2.0;
    let content = format!(
        "q 0 0 0 RG {BORDER_WIDTH} w {inset} {inset} {:.3} {:.3} re S Q",
        (width - BORDER_WIDTH).max(0.0),
        (height - BORDER_WIDTH).max(0.0),
    );
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => reals(&[0.0, 0.0, width, height]),
            "Resources" => Dictionary::new(),
        },
        content.into_bytes(),
    )
}

fn square_annotation(doc: &mut lopdf::Document, page_id: ObjectId, rect: [f64; 4]) -> ObjectId {
    let appearance_id = doc.add_object(appearance_stream(rect[2] - rect[0], rect[3] - rect[1]));
    doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Square",
        "Rect" => reals(&rect),
        "C" => reals(&[0.0, 0.0, 0.0]),
        "Border" => reals(&[0.0, 0.0, BORDER_WIDTH]),
        "BS" => dictionary! {
            "Type" => "Border",
            "W" => Object::Real(BORDER_WIDTH as f32),
            "S" => "S",
        },
        "F" => FLAG_PRINT,
        "P" => page_id,
        "AP" => dictionary! { "N" => appearance_id },
    })
}

/// Add one rectangle annotation per box to the page at 0-based `page_index`.
///
/// Boxes are in top-left page coordinates. New annotations are appended to
/// the page's existing `/Annots`, whether it is an inline array or an
/// indirect one. Returns the number of annotations added.
pub fn annotate_page(
    doc: &mut LopdfDocument,
    page_index: usize,
    boxes: &[BBox],
) -> Result<usize, BackendError> {
    if boxes.is_empty() {
        return Ok(0);
    }
    let page_id = doc.page_id(page_index)?;
    let geometry = doc.page_geometry(page_index)?.value;

    let inner = doc.inner_mut();
    let new_refs: Vec<Object> = boxes
        .iter()
        .map(|bbox| Object::Reference(square_annotation(inner, page_id, geometry.to_pdf_rect(bbox))))
        .collect();
    let added = new_refs.len();

    let page_dict = inner
        .get_object(page_id)
        .and_then(|o| o.as_dict())
        .map_err(|e| BackendError::Annotation(format!("failed to get page dictionary: {e}")))?;
    let indirect_annots = match page_dict.get(b"Annots") {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    };

    match indirect_annots {
        Some(id) => {
            let annots = inner
                .get_object_mut(id)
                .and_then(|o| o.as_array_mut())
                .map_err(|e| BackendError::Annotation(format!("/Annots is not an array: {e}")))?;
            annots.extend(new_refs);
        }
        None => {
            let page_dict = inner
                .get_object_mut(page_id)
                .and_then(|o| o.as_dict_mut())
                .map_err(|e| {
                    BackendError::Annotation(format!("failed to get page dictionary: {e}"))
                })?;
            match page_dict.get_mut(b"Annots") {
                Ok(Object::Array(annots)) => annots.extend(new_refs),
                _ => page_dict.set("Annots", Object::Array(new_refs)),
            }
        }
    }

    debug!(page = page_index, added, "added rectangle annotations");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lopdf_backend::tests::pdf_with_pages;

    fn annots_of(doc: &LopdfDocument, page_index: usize) -> Vec<Dictionary> {
        let inner = doc.inner();
        let page = inner
            .get_object(doc.page_id(page_index).unwrap())
            .and_then(|o| o.as_dict())
            .unwrap();
        let annots = match page.get(b"Annots").unwrap() {
            Object::Reference(id) => inner.get_object(*id).unwrap().as_array().unwrap(),
            other => other.as_array().unwrap(),
        };
        annots
            .iter()
            .map(|r| {
                inner
                    .get_object(r.as_reference().unwrap())
                    .unwrap()
                    .as_dict()
                    .unwrap()
                    .clone()
            })
            .collect()
    }

    fn rect_of(annot: &Dictionary) -> Vec<f64> {
        annot
            .get(b"Rect")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o.as_float().unwrap() as f64)
            .collect()
    }

    #[test]
    fn adds_square_annotations_in_pdf_space() {
        let mut doc = LopdfDocument::open(&pdf_with_pages(&[b""]), None).unwrap();
        let added = annotate_page(
            &mut doc,
            0,
            &[
                BBox::new(72.0, 63.0, 134.0, 75.0),
                BBox::new(10.0, 10.0, 20.0, 20.0),
            ],
        )
        .unwrap();
        assert_eq!(added, 2);

        let annots = annots_of(&doc, 0);
        assert_eq!(annots.len(), 2);
        let first = &annots[0];
        assert_eq!(first.get(b"Subtype").unwrap().as_name().unwrap(), b"Square");
        assert_eq!(first.get(b"F").unwrap().as_i64().unwrap(), 4);
        assert_eq!(rect_of(first), vec![72.0, 717.0, 134.0, 729.0]);
        assert!(first.get(b"AP").is_ok());
    }

    #[test]
    fn appends_to_inline_annots() {
        let mut doc = LopdfDocument::open(&pdf_with_pages(&[b""]), None).unwrap();
        annotate_page(&mut doc, 0, &[BBox::new(0.0, 0.0, 5.0, 5.0)]).unwrap();
        annotate_page(&mut doc, 0, &[BBox::new(10.0, 0.0, 15.0, 5.0)]).unwrap();
        assert_eq!(annots_of(&doc, 0).len(), 2);
    }

    #[test]
    fn appends_to_indirect_annots() {
        let mut doc = LopdfDocument::open(&pdf_with_pages(&[b""]), None).unwrap();
        let page_id = doc.page_id(0).unwrap();
        {
            let inner = doc.inner_mut();
            let existing = inner.add_object(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Text",
                "Rect" => reals(&[0.0, 0.0, 10.0, 10.0]),
            });
            let array_id = inner.add_object(Object::Array(vec![Object::Reference(existing)]));
            inner
                .get_object_mut(page_id)
                .and_then(|o| o.as_dict_mut())
                .unwrap()
                .set("Annots", Object::Reference(array_id));
        }
        annotate_page(&mut doc, 0, &[BBox::new(1.0, 1.0, 2.0, 2.0)]).unwrap();
        let annots = annots_of(&doc, 0);
        assert_eq!(annots.len(), 2);
        assert_eq!(annots[1].get(b"Subtype").unwrap().as_name().unwrap(), b"Square");
    }

    #[test]
    fn empty_boxes_leave_page_untouched() {
        let mut doc = LopdfDocument::open(&pdf_with_pages(&[b""]), None).unwrap();
        assert_eq!(annotate_page(&mut doc, 0, &[]).unwrap(), 0);
        let page = doc
            .inner()
            .get_object(doc.page_id(0).unwrap())
            .and_then(|o| o.as_dict())
            .unwrap();
        assert!(page.get(b"Annots").is_err());
    }

    #[test]
    fn bad_page_index_is_error() {
        let mut doc = LopdfDocument::open(&pdf_with_pages(&[b""]), None).unwrap();
        assert!(annotate_page(&mut doc, 3, &[BBox::new(0.0, 0.0, 1.0, 1.0)]).is_err());
    }

    #[test]
    fn annotations_survive_save() {
        let mut doc = LopdfDocument::open(&pdf_with_pages(&[b"", b""]), None).unwrap();
        annotate_page(&mut doc, 1, &[BBox::new(5.0, 5.0, 50.0, 50.0)]).unwrap();
        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        let reopened = LopdfDocument::open(&buf, None).unwrap();
        assert_eq!(annots_of(&reopened, 1).len(), 1);
    }
}
