use proc_macro::TokenStream;
use quote::quote;

#[derive(deluxe::ParseMetaItem)]
#[deluxe(attributes(scoring_feature))]
struct FeatureAttributes(syn::Ident, #[deluxe(flatten)] FeatureNamedAttributes);

#[derive(deluxe::ParseMetaItem)]
struct FeatureNamedAttributes {
  name: String,
}

/// Declare a place matching feature from its scoring function.
///
/// The annotated function becomes the `score_feature` method of a new unit
/// struct named after the first argument, implementing `Feature`.
///
/// ```ignore
/// #[scoring_feature(PostalCodeMatch, name = "postal_code_match")]
/// fn score_feature(&self, bump: &Bump, lhs: &PlaceQuery, rhs: &Place) -> f64 {
///   0.0
/// }
/// ```
#[proc_macro_attribute]
pub fn scoring_feature(attrs: TokenStream, input: TokenStream) -> TokenStream {
  let FeatureAttributes(ident, FeatureNamedAttributes { name }) = match deluxe::parse2::<FeatureAttributes>(attrs.into()) {
    Ok(attrs) => attrs,
    Err(err) => return err.into_compile_error().into(),
  };

  let input = proc_macro2::TokenStream::from(input);

  quote! {
      pub struct #ident;

      impl Feature for #ident {
        fn name(&self) -> &'static str {
            #name
        }

        #[tracing::instrument(level = "trace", name = #name, skip_all, fields(place_id = rhs.place_id))]
        #input
      }
  }
  .into()
}
