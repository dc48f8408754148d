//! Usage text for the JSON listing handler.

use shop_core::BaseUrl;

use crate::translate::ID_PATH_PREFIX;

const PARAMETERS: &str = "\
Search Parameters
-----------------

q      ... free-text query
f      ... filter clause, repeatable and AND-combined (..&f=..&f=..)
           (the 'filter' value of a facet in a result works as-is)
c      ... category, repeatable and AND-combined (..&c=shirts&c=underwear)
           (for OR use a filter: ..&f=+category:(shirts underwear))
t      ... tag, repeatable and AND-combined (..&t=shirts&t=cool)
           (for OR use a filter: ..&f=+tags:(shirts cool))
s      ... zero-based start index for paging
r      ... rows per page, 1 to 100 (default 10)
narrow ... facet refinement as name:value (..&narrow=color_n:red)

Variations
----------

Variations are excluded from searches. Fetch them from a listing's detail page.

Debug Parameters
----------------

help   ... print this text
text   ... pretty-print the response as text/plain
";

/// Build the usage text for a handler mounted at `base_url`.
pub fn help_text(base_url: &BaseUrl) -> String {
    let by_id = base_url.join(&format!("{}<id>", &ID_PATH_PREFIX[1..]));

    let mut out = String::from("Listing JSON Usage\n==================\n\n");
    out.push_str(&format!("      List all listings: {}\n", base_url));
    out.push_str(&format!("  Fetch a single listing: {}\n", base_url.join("<uripath>")));
    out.push_str(&format!("                      or: {}\n", by_id));
    out.push('\n');
    out.push_str(PARAMETERS);
    out
}
