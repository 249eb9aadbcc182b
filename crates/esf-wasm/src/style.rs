//! Stylesheet for the injected controls.

use web_sys::Document;

use crate::InitError;

const STYLE_ID: &str = "ex_filter_style";

const CSS: &str = "\
.ex-filter-block { padding: 5px; color: #9fbbcb; font-size: 13px; font-family: \"Motiva Sans\", Sans-serif; \
white-space: nowrap; overflow: hidden; text-overflow: ellipsis; }
.ex-filter-caption { font-weight: bold; }
.ex-filter-block label { display: block; padding: 0 5px; line-height: 20px; }
.ex-filter-block input { width: 200px; transition: all .2s; }
.ex-filter-block-half { display: inline-block; width: 49%; }
.ex-filter-block-half input { width: 90px; margin: 3px; padding: 5px; background-color: rgba(0,0,0,0.2); \
color: #fff; border: 1px solid rgba(0,0,0,0.3); border-radius: 3px; box-shadow: 1px 1px 0px rgba(255,255,255,0.2); }
.ex-filter-block input[type=number]:invalid { background-color: rgba(250,150,150,.7); border-color: #f00; }
.range_container { margin-top: 5px; }
#ex_discount { margin-top: 8px; }
";

/// Append the stylesheet to `<head>` once.
pub(crate) fn inject(document: &Document) -> Result<(), InitError> {
    if document.get_element_by_id(STYLE_ID).is_some() {
        return Ok(());
    }
    let head = document.head().ok_or(InitError::MissingElement("head"))?;

    let style = document.create_element("style")?;
    style.set_id(STYLE_ID);
    style.set_attribute("type", "text/css")?;
    style.set_text_content(Some(CSS));
    head.append_child(&style)?;
    Ok(())
}
